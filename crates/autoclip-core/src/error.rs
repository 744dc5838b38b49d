use thiserror::Error;

use crate::ports::CollaboratorError;

/// Errors raised by the bounded task queue itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("task queue is full (capacity={capacity}), dropping task {task}")]
    QueueFull { capacity: usize, task: String },

    #[error("mark_done called with no task in flight")]
    NothingInFlight,
}

/// Errors a task can end with. Workers log these; they never propagate further.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("no video generator available for {mode} input")]
    NoGenerator { mode: String },

    #[error("{operation} dropped after {attempts} attempts: {reason}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        reason: String,
    },

    #[error("requeue rejected: {0}")]
    Requeue(#[from] QueueError),

    #[error("{0}")]
    Other(String),
}

impl TaskError {
    /// Retry exhaustion is an expected end state, logged at warn rather than error.
    pub fn is_drop(&self) -> bool {
        matches!(self, TaskError::RetryExhausted { .. } | TaskError::Requeue(_))
    }
}
