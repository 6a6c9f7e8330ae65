//! Result sinks.
//!
//! A sink receives one outcome per job and a final batch-complete call.
//! The dispatcher invokes it under the batch lock, so implementations never
//! see two callbacks at once and need no locking of their own.

use crate::dispatch::dispatcher::BatchSummary;
use crate::dispatch::job::DispatchError;
use crate::transport::TransportResponse;

/// Outcome of one job.
pub type ItemResult = Result<TransportResponse, DispatchError>;

/// Receiver of batch results.
pub trait ResultSink: Send + 'static {
    /// Called exactly once per job, in completion order.
    fn on_item_result(&mut self, index: usize, result: ItemResult);

    /// Called exactly once, after the last `on_item_result`.
    fn on_batch_complete(&mut self, _summary: &BatchSummary) {}
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn on_item_result(&mut self, index: usize, result: ItemResult) {
        (**self).on_item_result(index, result)
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        (**self).on_batch_complete(summary)
    }
}

/// Sink built from a closure; batch completion is ignored.
pub struct FnSink<F>(F);

impl<F> ResultSink for FnSink<F>
where
    F: FnMut(usize, ItemResult) + Send + 'static,
{
    fn on_item_result(&mut self, index: usize, result: ItemResult) {
        (self.0)(index, result)
    }
}

/// Wrap a closure as a [`ResultSink`].
pub fn sink_fn<F>(f: F) -> FnSink<F>
where
    F: FnMut(usize, ItemResult) + Send + 'static,
{
    FnSink(f)
}
