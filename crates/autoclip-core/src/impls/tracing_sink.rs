//! EventSink that writes every domain event as a structured log line.

use tracing::{error, info, warn};

use crate::domain::DomainEvent;
use crate::ports::EventSink;

/// Default sink. Operators reconstruct a cycle from these lines alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: DomainEvent) {
        match event {
            DomainEvent::TaskRejected { task, capacity } => {
                warn!(task = %task, capacity, "task queue is full, dropping task");
            }
            DomainEvent::TaskStarted {
                worker,
                task_id,
                task,
            } => {
                info!(worker, task_id = %task_id, task = %task, "starting task");
            }
            DomainEvent::TaskSucceeded {
                worker,
                task_id,
                task,
            } => {
                info!(worker, task_id = %task_id, task = %task, "task finished");
            }
            DomainEvent::TaskFailed {
                worker,
                task_id,
                task,
                error,
                dropped,
            } => {
                if dropped {
                    warn!(worker, task_id = %task_id, task = %task, error = %error, "task dropped");
                } else {
                    error!(worker, task_id = %task_id, task = %task, error = %error, "task failed");
                }
            }
            DomainEvent::AttemptProduced {
                operation,
                operation_id,
                attempt,
                url,
            } => {
                info!(
                    operation = %operation,
                    operation_id = %operation_id,
                    attempt,
                    url = %url,
                    "attempt produced a result"
                );
            }
            DomainEvent::AttemptRequeued {
                operation,
                operation_id,
                next_attempt,
                reason,
            } => {
                warn!(
                    operation = %operation,
                    operation_id = %operation_id,
                    next_attempt,
                    reason = %reason,
                    "attempt failed, re-enqueueing"
                );
            }
            DomainEvent::AttemptDropped {
                operation,
                operation_id,
                attempts,
                reason,
            } => {
                warn!(
                    operation = %operation,
                    operation_id = %operation_id,
                    attempts,
                    reason = %reason,
                    "too many retries, dropping operation"
                );
            }
            DomainEvent::Quiescent { counts } => {
                info!(
                    completed = counts.completed,
                    rejected = counts.rejected,
                    drains = counts.drains,
                    "all tasks processed, waiting for next cycle"
                );
            }
        }
    }
}
