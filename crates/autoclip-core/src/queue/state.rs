//! Queue state guarded by the queue mutex.

use std::collections::VecDeque;

use super::Task;
use crate::error::QueueError;
use crate::observability::QueueCounts;

/// Waiting tasks plus the counters the idle check relies on.
///
/// Invariants:
/// - `waiting.len() <= capacity`
/// - idle iff `waiting` is empty and `in_flight == 0`
#[derive(Debug, Default)]
pub(crate) struct QueueState {
    waiting: VecDeque<Task>,
    in_flight: usize,
    submitted: u64,
    rejected: u64,
    completed: u64,
    drains: u64,
}

impl QueueState {
    /// Append at the tail. Hands the task back when full.
    pub(crate) fn push(&mut self, task: Task, capacity: usize) -> Result<(), Task> {
        if self.waiting.len() >= capacity {
            self.rejected += 1;
            return Err(task);
        }
        self.waiting.push_back(task);
        self.submitted += 1;
        Ok(())
    }

    /// Pop the head and count it as in flight.
    pub(crate) fn pop(&mut self) -> Option<Task> {
        let task = self.waiting.pop_front()?;
        self.in_flight += 1;
        Some(task)
    }

    /// Record completion of one in-flight task. Returns true when this
    /// completion drained the queue.
    pub(crate) fn finish(&mut self) -> Result<bool, QueueError> {
        if self.in_flight == 0 {
            return Err(QueueError::NothingInFlight);
        }
        self.in_flight -= 1;
        self.completed += 1;

        let drained = self.in_flight == 0 && self.waiting.is_empty();
        if drained {
            self.drains += 1;
        }
        Ok(drained)
    }

    pub(crate) fn counts(&self) -> QueueCounts {
        QueueCounts {
            waiting: self.waiting.len(),
            in_flight: self.in_flight,
            submitted: self.submitted,
            rejected: self.rejected,
            completed: self.completed,
            drains: self.drains,
        }
    }
}
