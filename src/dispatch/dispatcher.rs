//! Bounded batch dispatcher.
//!
//! # Data Flow
//! ```text
//! producer (corpus order)
//!     → record added (batch lock)
//!     → parse error? report Malformed, record done
//!     → acquire slot (FIFO)
//!     → spawn job task
//!           → Transport::issue
//!           → drop slot
//!           → on_item_result + record done (batch lock)
//!           → last one out fires on_batch_complete
//! ```
//!
//! # Design Decisions
//! - The slot is released before result processing so a queued job can start
//!   while the previous result is still being handled
//! - Counters and the sink share one lock, so callbacks never interleave
//! - A panicking transport call is turned into a failed result, never a lost job
//! - A stop request ends enumeration; in-flight jobs still finish

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::dispatch::budget::ConcurrencyBudget;
use crate::dispatch::counters::BatchCounters;
use crate::dispatch::job::{DispatchError, JobState, JobTicket};
use crate::dispatch::sink::{ItemResult, ResultSink};
use crate::observability::metrics;
use crate::request::{MalformedRequest, ParsedRequest};
use crate::transport::{Transport, TransportError};

/// Final accounting of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub added: u64,
    pub done: u64,
    pub succeeded: u64,
    /// Parse and transport failures.
    pub failed: u64,
    /// Jobs dropped by a stop request before they got a slot.
    pub cancelled: u64,
    /// Enumeration ended early because of a stop request.
    pub stopped: bool,
    pub peak_in_flight: usize,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

struct BatchState<S> {
    batch_id: Uuid,
    started: Instant,
    counters: BatchCounters,
    succeeded: u64,
    failed: u64,
    cancelled: u64,
    stopped: bool,
    producer_finished: bool,
    summary: Option<BatchSummary>,
    budget: ConcurrencyBudget,
    sink: S,
}

impl<S: ResultSink> BatchState<S> {
    fn record_result(&mut self, index: usize, result: ItemResult) {
        match &result {
            Ok(_) => self.succeeded += 1,
            Err(DispatchError::Cancelled) => self.cancelled += 1,
            Err(_) => self.failed += 1,
        }
        self.sink.on_item_result(index, result);
        self.counters.record_done();
        self.complete_if_drained();
    }

    fn complete_if_drained(&mut self) {
        if self.summary.is_some() || !self.producer_finished || !self.counters.is_drained() {
            return;
        }
        self.complete();
    }

    fn complete(&mut self) {
        let summary = self.snapshot();
        info!(
            batch_id = %summary.batch_id,
            added = summary.added,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch complete"
        );
        self.sink.on_batch_complete(&summary);
        self.summary = Some(summary);
    }

    fn snapshot(&self) -> BatchSummary {
        BatchSummary {
            batch_id: self.batch_id,
            added: self.counters.added(),
            done: self.counters.done(),
            succeeded: self.succeeded,
            failed: self.failed,
            cancelled: self.cancelled,
            stopped: self.stopped,
            peak_in_flight: self.budget.peak_in_flight(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Runs batches of parsed requests against one transport with at most
/// `concurrency` calls in flight.
///
/// Each instance owns its budget and counters. `run_batch` consumes the
/// dispatcher, so concurrent batches need independent instances.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    budget: ConcurrencyBudget,
    stop: Option<broadcast::Receiver<()>>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: Arc<T>, concurrency: usize) -> Self {
        Self {
            transport,
            budget: ConcurrencyBudget::new(concurrency),
            stop: None,
        }
    }

    /// Stop enumerating jobs once a message arrives on `stop`.
    pub fn with_stop(mut self, stop: broadcast::Receiver<()>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Handle to this dispatcher's budget, for observing in-flight counts.
    pub fn budget(&self) -> ConcurrencyBudget {
        self.budget.clone()
    }

    /// Dispatch every job and wait for the batch to complete.
    ///
    /// Every job yields exactly one `on_item_result`; `on_batch_complete`
    /// fires once, after all of them.
    pub async fn run_batch<I, S>(mut self, jobs: I, sink: S) -> BatchSummary
    where
        I: IntoIterator<Item = Result<ParsedRequest, MalformedRequest>>,
        S: ResultSink,
    {
        let batch_id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(BatchState {
            batch_id,
            started: Instant::now(),
            counters: BatchCounters::new(),
            succeeded: 0,
            failed: 0,
            cancelled: 0,
            stopped: false,
            producer_finished: false,
            summary: None,
            budget: self.budget.clone(),
            sink,
        }));

        info!(
            %batch_id,
            transport = self.transport.name(),
            concurrency = self.budget.capacity(),
            "batch started"
        );

        let mut tasks = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            reap_finished(&mut tasks, batch_id);
            let mut ticket = JobTicket::new(index);
            state.lock().await.counters.record_added();
            ticket.advance(JobState::AwaitingSlot);

            let request = match job {
                Ok(request) => request,
                Err(e) => {
                    warn!(%batch_id, index, error = %e, "request did not parse, skipping");
                    metrics::record_parse_failure();
                    ticket.advance(JobState::Completed);
                    state.lock().await.record_result(index, Err(DispatchError::Malformed(e)));
                    continue;
                }
            };

            let slot = tokio::select! {
                biased;
                _ = stop_requested(&mut self.stop) => None,
                slot = self.budget.acquire() => slot,
            };
            let Some(slot) = slot else {
                info!(%batch_id, index, "stop requested, no further jobs are queued");
                self.budget.close();
                ticket.advance(JobState::Completed);
                let mut guard = state.lock().await;
                guard.stopped = true;
                guard.record_result(index, Err(DispatchError::Cancelled));
                break;
            };
            ticket.advance(JobState::InFlight);

            let transport = Arc::clone(&self.transport);
            let state = Arc::clone(&state);
            tasks.spawn(async move {
                debug!(%batch_id, index, url = request.url(), "issuing request");
                let outcome = AssertUnwindSafe(transport.issue(&request))
                    .catch_unwind()
                    .await
                    .unwrap_or(Err(TransportError::Panicked));
                drop(slot);
                ticket.advance(JobState::Completed);

                match &outcome {
                    Ok(response) => {
                        debug!(
                            %batch_id,
                            index,
                            status = ?response.status,
                            bytes = response.body.len(),
                            "request completed"
                        );
                        metrics::record_request(transport.name(), "ok", response.elapsed);
                    }
                    Err(e) => {
                        debug!(%batch_id, index, error = %e, "request failed");
                        metrics::record_failure(transport.name(), e.kind());
                    }
                }

                state
                    .lock()
                    .await
                    .record_result(index, outcome.map_err(DispatchError::from));
            });
        }

        {
            let mut guard = state.lock().await;
            guard.producer_finished = true;
            debug!(%batch_id, added = guard.counters.added(), "producer finished");
            guard.complete_if_drained();
        }

        while let Some(joined) = tasks.join_next().await {
            log_abnormal_end(joined, batch_id);
        }

        let mut guard = state.lock().await;
        if guard.summary.is_none() {
            error!(
                %batch_id,
                outstanding = guard.counters.outstanding(),
                "all job tasks ended before the batch drained"
            );
            guard.complete();
        }
        guard.summary.clone().unwrap_or_else(|| guard.snapshot())
    }
}

/// Drop the handles of job tasks that already ended.
fn reap_finished(tasks: &mut JoinSet<()>, batch_id: Uuid) {
    while let Some(joined) = tasks.try_join_next() {
        log_abnormal_end(joined, batch_id);
    }
}

fn log_abnormal_end(joined: Result<(), JoinError>, batch_id: Uuid) {
    if let Err(e) = joined {
        error!(%batch_id, error = %e, "job task ended abnormally");
    }
}

/// Resolve when a stop was requested; never resolves without a receiver.
async fn stop_requested(stop: &mut Option<broadcast::Receiver<()>>) {
    if let Some(rx) = stop.as_mut() {
        let received = rx.recv().await;
        if !matches!(received, Err(broadcast::error::RecvError::Closed)) {
            return;
        }
        // sender gone: no stop can arrive any more
        *stop = None;
    }
    std::future::pending::<()>().await
}

/// Run one batch on a fresh [`Dispatcher`].
pub async fn run_batch<T, I, S>(
    jobs: I,
    concurrency: usize,
    transport: Arc<T>,
    sink: S,
) -> BatchSummary
where
    T: Transport,
    I: IntoIterator<Item = Result<ParsedRequest, MalformedRequest>>,
    S: ResultSink,
{
    Dispatcher::new(transport, concurrency).run_batch(jobs, sink).await
}
