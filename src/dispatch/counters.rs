/// Per-batch progress counters.
///
/// Only ever mutated while holding the batch lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounters {
    added: u64,
    done: u64,
}

impl BatchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// A job was queued.
    pub fn record_added(&mut self) {
        self.added += 1;
    }

    /// A job reached its terminal state.
    pub fn record_done(&mut self) {
        debug_assert!(self.done < self.added, "done would exceed added");
        self.done += 1;
    }

    pub fn added(&self) -> u64 {
        self.added
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    /// Jobs queued but not yet completed.
    pub fn outstanding(&self) -> u64 {
        self.added - self.done
    }

    /// Every queued job has completed.
    pub fn is_drained(&self) -> bool {
        self.done >= self.added
    }
}
