//! Per-job bookkeeping.

use std::fmt;

use thiserror::Error;

use crate::request::MalformedRequest;
use crate::transport::TransportError;

/// Lifecycle of one job.
///
/// ```text
/// Queued → AwaitingSlot → InFlight → Completed
/// ```
/// A job that never reaches `InFlight` (parse failure, batch stopped) goes
/// straight to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    AwaitingSlot,
    InFlight,
    Completed,
}

impl JobState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Queued, JobState::AwaitingSlot)
                | (JobState::AwaitingSlot, JobState::InFlight)
                | (JobState::InFlight, JobState::Completed)
                | (JobState::Queued, JobState::Completed)
                | (JobState::AwaitingSlot, JobState::Completed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Queued => "queued",
            JobState::AwaitingSlot => "awaiting_slot",
            JobState::InFlight => "in_flight",
            JobState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Position of a job in the corpus plus its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTicket {
    index: usize,
    state: JobState,
}

impl JobTicket {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            state: JobState::Queued,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Move to `next`. Illegal transitions are a bug in the dispatcher.
    pub fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "job {} cannot go from {} to {}",
            self.index,
            self.state,
            next
        );
        tracing::trace!(index = self.index, from = %self.state, to = %next, "job transition");
        self.state = next;
    }
}

/// Why a job produced no response.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The rendered template did not parse; nothing was sent.
    #[error("malformed request: {0}")]
    Malformed(#[from] MalformedRequest),

    /// The transport call ended in failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The batch was stopped before this job got a slot.
    #[error("batch stopped before the request was sent")]
    Cancelled,
}
