//! Dispatcher behaviour against an in-memory transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use raw_sender::dispatch::{
    run_batch, sink_fn, BatchSummary, ConcurrencyBudget, DispatchError, Dispatcher, ItemResult,
    ResultSink,
};
use raw_sender::lifecycle::StopSignal;
use raw_sender::request::MalformedRequest;
use raw_sender::transport::TransportError;

mod common;
use common::{jobs, FakeTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Item { index: usize, ok: bool },
    Complete { added: u64, done: u64 },
}

/// Sink recording every callback in order.
#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
    bodies: Arc<Mutex<Vec<(usize, ItemResult)>>>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn item_indexes(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Item { index, .. } => Some(index),
                Event::Complete { .. } => None,
            })
            .collect()
    }

    fn take_results(&self) -> Vec<(usize, ItemResult)> {
        let mut results = std::mem::take(&mut *self.bodies.lock().unwrap());
        results.sort_by_key(|(index, _)| *index);
        results
    }
}

impl ResultSink for Recorder {
    fn on_item_result(&mut self, index: usize, result: ItemResult) {
        self.events.lock().unwrap().push(Event::Item {
            index,
            ok: result.is_ok(),
        });
        self.bodies.lock().unwrap().push((index, result));
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        self.events.lock().unwrap().push(Event::Complete {
            added: summary.added,
            done: summary.done,
        });
    }
}

fn paths(count: usize, prefix: &str) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_never_exceeds_concurrency() {
    let transport = Arc::new(FakeTransport::new(Duration::from_millis(10)));
    let paths = paths(20, "/item/");
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();

    let dispatcher = Dispatcher::new(Arc::clone(&transport), 3);
    let budget = dispatcher.budget();
    let summary = dispatcher.run_batch(jobs(&paths), Recorder::default()).await;

    assert!(transport.max_concurrent() <= 3, "saw {}", transport.max_concurrent());
    assert_eq!(budget.peak_in_flight(), 3);
    assert_eq!(summary.peak_in_flight, 3);
    assert_eq!(budget.in_flight(), 0);
    assert_eq!(transport.calls(), 20);
}

#[tokio::test]
async fn completion_fires_once_after_every_result() {
    let transport = Arc::new(FakeTransport::new(Duration::from_millis(1)));
    let recorder = Recorder::default();
    let paths = ["/delay/15", "/delay/1", "/delay/8", "/delay/3", "/delay/0"];

    let summary = Dispatcher::new(transport, 2)
        .run_batch(jobs(&paths), recorder.clone())
        .await;

    let events = recorder.events();
    assert_eq!(events.len(), 6);
    assert_eq!(events.last(), Some(&Event::Complete { added: 5, done: 5 }));
    assert_eq!(
        events.iter().filter(|e| matches!(e, Event::Complete { .. })).count(),
        1
    );

    let mut indexes = recorder.item_indexes();
    indexes.sort_unstable();
    assert_eq!(indexes, vec![0, 1, 2, 3, 4]);

    assert_eq!(summary.added, 5);
    assert_eq!(summary.done, 5);
    assert_eq!(summary.succeeded, 5);
}

#[tokio::test]
async fn empty_batch_completes_immediately() {
    let recorder = Recorder::default();
    let summary = run_batch(
        Vec::new(),
        4,
        Arc::new(FakeTransport::new(Duration::ZERO)),
        recorder.clone(),
    )
    .await;

    assert_eq!(recorder.events(), vec![Event::Complete { added: 0, done: 0 }]);
    assert_eq!((summary.added, summary.done), (0, 0));
}

#[tokio::test]
async fn single_slot_preserves_corpus_order() {
    let recorder = Recorder::default();
    let paths = ["/delay/5", "/a", "/delay/2", "/b"];

    run_batch(
        jobs(&paths),
        1,
        Arc::new(FakeTransport::new(Duration::ZERO)),
        recorder.clone(),
    )
    .await;

    assert_eq!(recorder.item_indexes(), vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn parse_failures_are_reported_and_counted() {
    let recorder = Recorder::default();
    let mut batch = jobs(&["/a", "/b"]);
    batch.insert(1, Err(MalformedRequest::MissingHost));
    let transport = Arc::new(FakeTransport::new(Duration::ZERO));

    let summary = run_batch(batch, 2, Arc::clone(&transport), recorder.clone()).await;

    assert_eq!(transport.calls(), 2);
    assert_eq!(summary.added, 3);
    assert_eq!(summary.done, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 2);

    let results = recorder.take_results();
    assert!(matches!(
        results[1].1,
        Err(DispatchError::Malformed(MalformedRequest::MissingHost))
    ));
}

#[tokio::test]
async fn a_failing_job_does_not_affect_its_siblings() {
    let recorder = Recorder::default();
    let summary = run_batch(
        jobs(&["/one", "/fail", "/two"]),
        3,
        Arc::new(FakeTransport::new(Duration::from_millis(2))),
        recorder.clone(),
    )
    .await;

    let results = recorder.take_results();
    assert_eq!(results[0].1.as_ref().unwrap().body, "/one");
    assert!(matches!(
        results[1].1,
        Err(DispatchError::Transport(TransportError::Http(_)))
    ));
    assert_eq!(results[2].1.as_ref().unwrap().body, "/two");
    assert_eq!((summary.succeeded, summary.failed), (2, 1));
}

#[tokio::test]
async fn panicking_transport_becomes_a_failed_result() {
    let recorder = Recorder::default();
    let summary = run_batch(
        jobs(&["/panic", "/ok"]),
        2,
        Arc::new(FakeTransport::new(Duration::ZERO)),
        recorder.clone(),
    )
    .await;

    let results = recorder.take_results();
    assert!(matches!(
        results[0].1,
        Err(DispatchError::Transport(TransportError::Panicked))
    ));
    assert!(results[1].1.is_ok());
    assert_eq!(summary.done, 2);
}

#[tokio::test]
async fn slot_is_released_before_the_result_callback() {
    let transport = Arc::new(FakeTransport::new(Duration::from_millis(1)));
    let dispatcher = Dispatcher::new(transport, 1);
    let budget: ConcurrencyBudget = dispatcher.budget();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = {
        let seen = Arc::clone(&seen);
        sink_fn(move |_, _| seen.lock().unwrap().push(budget.in_flight()))
    };
    dispatcher.run_batch(jobs(&["/only"]), sink).await;

    assert_eq!(*seen.lock().unwrap(), vec![0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn result_callbacks_never_overlap() {
    struct Exclusive {
        busy: Arc<AtomicBool>,
        overlaps: Arc<Mutex<usize>>,
    }

    impl ResultSink for Exclusive {
        fn on_item_result(&mut self, _: usize, _: ItemResult) {
            if self.busy.swap(true, Ordering::SeqCst) {
                *self.overlaps.lock().unwrap() += 1;
            }
            std::thread::sleep(Duration::from_millis(1));
            self.busy.store(false, Ordering::SeqCst);
        }
    }

    let overlaps = Arc::new(Mutex::new(0));
    let sink = Exclusive {
        busy: Arc::new(AtomicBool::new(false)),
        overlaps: Arc::clone(&overlaps),
    };
    let paths = paths(30, "/p/");
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();

    let summary = run_batch(
        jobs(&paths),
        8,
        Arc::new(FakeTransport::new(Duration::from_millis(1))),
        sink,
    )
    .await;

    assert_eq!(summary.done, 30);
    assert_eq!(*overlaps.lock().unwrap(), 0);
}

#[tokio::test]
async fn stop_before_start_cancels_the_first_job() {
    let stop = StopSignal::new();
    let receiver = stop.subscribe();
    stop.trigger();

    let transport = Arc::new(FakeTransport::new(Duration::ZERO));
    let recorder = Recorder::default();
    let summary = Dispatcher::new(Arc::clone(&transport), 2)
        .with_stop(receiver)
        .run_batch(jobs(&["/a", "/b", "/c"]), recorder.clone())
        .await;

    assert!(summary.stopped);
    assert_eq!((summary.added, summary.done, summary.cancelled), (1, 1, 1));
    assert_eq!(transport.calls(), 0);
    assert!(matches!(
        recorder.take_results()[0].1,
        Err(DispatchError::Cancelled)
    ));
    assert_eq!(recorder.events().last(), Some(&Event::Complete { added: 1, done: 1 }));
}

#[tokio::test]
async fn stop_lets_in_flight_jobs_finish() {
    let stop = StopSignal::new();
    let transport = Arc::new(FakeTransport::new(Duration::ZERO));
    let recorder = Recorder::default();
    let dispatcher = Dispatcher::new(Arc::clone(&transport), 1).with_stop(stop.subscribe());

    let trigger = {
        let stop = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            stop.trigger();
        })
    };

    let summary = dispatcher
        .run_batch(
            jobs(&["/delay/150", "/delay/150", "/delay/150"]),
            recorder.clone(),
        )
        .await;
    trigger.await.unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(summary.added, 2);
    assert_eq!(summary.done, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.cancelled, 1);

    let results = recorder.take_results();
    assert_eq!(results[0].1.as_ref().unwrap().body, "/delay/150");
    assert!(matches!(results[1].1, Err(DispatchError::Cancelled)));
}

#[tokio::test]
async fn independent_dispatchers_do_not_share_state() {
    let transport = Arc::new(FakeTransport::new(Duration::from_millis(2)));
    let first = Dispatcher::new(Arc::clone(&transport), 1);
    let second = Dispatcher::new(Arc::clone(&transport), 1);

    let (a, b) = tokio::join!(
        first.run_batch(jobs(&["/a", "/b"]), Recorder::default()),
        second.run_batch(jobs(&["/c"]), Recorder::default()),
    );

    assert_ne!(a.batch_id, b.batch_id);
    assert_eq!((a.added, a.done), (2, 2));
    assert_eq!((b.added, b.done), (1, 1));
    assert_eq!(transport.calls(), 3);
}
