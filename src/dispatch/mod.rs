//! Dispatch subsystem.
//!
//! # Responsibilities
//! - Run one batch of jobs with a fixed concurrency budget
//! - Deliver exactly one result per job to a [`ResultSink`]
//! - Signal batch completion exactly once, after every result
//!
//! # Data Flow
//! ```text
//! jobs (Result<ParsedRequest, MalformedRequest>, corpus order)
//!     → dispatcher.rs  (producer + one task per job)
//!     → budget.rs      (FIFO slots, released on the terminal event)
//!     → transport      (one terminal event per call)
//!     → sink.rs        (serialized result callbacks)
//! ```

pub mod budget;
pub mod counters;
pub mod dispatcher;
pub mod job;
pub mod sink;

pub use budget::{ConcurrencyBudget, SlotGuard};
pub use counters::BatchCounters;
pub use dispatcher::{run_batch, BatchSummary, Dispatcher};
pub use job::{DispatchError, JobState, JobTicket};
pub use sink::{sink_fn, FnSink, ItemResult, ResultSink};
