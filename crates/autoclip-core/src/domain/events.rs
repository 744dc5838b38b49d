//! Domain events emitted by the queue, the workers, the retry wrapper and the
//! quiescence monitor. The default sink turns them into log lines.

use serde::Serialize;

use super::ids::{OperationId, TaskId};
use crate::observability::QueueCounts;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// `submit` failed because the queue was at capacity.
    TaskRejected { task: String, capacity: usize },

    TaskStarted {
        worker: usize,
        task_id: TaskId,
        task: String,
    },

    TaskSucceeded {
        worker: usize,
        task_id: TaskId,
        task: String,
    },

    /// The task future returned an error or panicked.
    TaskFailed {
        worker: usize,
        task_id: TaskId,
        task: String,
        error: String,
        /// Retry exhaustion and rejected requeues are expected drops.
        dropped: bool,
    },

    AttemptProduced {
        operation: String,
        operation_id: OperationId,
        attempt: u32,
        url: String,
    },

    AttemptRequeued {
        operation: String,
        operation_id: OperationId,
        /// Attempt number of the newly queued task.
        next_attempt: u32,
        reason: String,
    },

    AttemptDropped {
        operation: String,
        operation_id: OperationId,
        attempts: u32,
        reason: String,
    },

    /// Queue drained: nothing waiting, nothing in flight.
    Quiescent { counts: QueueCounts },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TaskRejected { .. } => "task_rejected",
            DomainEvent::TaskStarted { .. } => "task_started",
            DomainEvent::TaskSucceeded { .. } => "task_succeeded",
            DomainEvent::TaskFailed { .. } => "task_failed",
            DomainEvent::AttemptProduced { .. } => "attempt_produced",
            DomainEvent::AttemptRequeued { .. } => "attempt_requeued",
            DomainEvent::AttemptDropped { .. } => "attempt_dropped",
            DomainEvent::Quiescent { .. } => "quiescent",
        }
    }
}
