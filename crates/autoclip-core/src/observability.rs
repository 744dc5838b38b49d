use serde::{Deserialize, Serialize};

/// Point-in-time view of the task queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    /// Tasks sitting in the queue, not yet taken.
    pub waiting: usize,
    /// Tasks taken by a worker and not yet marked done.
    pub in_flight: usize,
    pub submitted: u64,
    pub rejected: u64,
    /// Tasks marked done (any outcome).
    pub completed: u64,
    /// Number of transitions from busy to idle.
    pub drains: u64,
}

impl QueueCounts {
    /// Submitted minus marked-done.
    pub fn outstanding(&self) -> usize {
        self.waiting + self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding() == 0
    }
}
