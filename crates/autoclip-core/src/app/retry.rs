//! Retry-by-requeue.
//!
//! A retry is not a loop: a failed attempt schedules a brand new task for
//! `attempt + 1` on the same queue, which may run on another worker and
//! possibly much later. The decision itself is the pure `next_action`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    AttemptOutcome, Decider, DomainEvent, NextAction, RetryState, TaskId, next_action,
};
use crate::error::{QueueError, TaskError};
use crate::ports::EventSink;
use crate::queue::{Task, TaskFuture, TaskQueue};

/// A top-level operation that may be retried through the queue.
#[async_trait]
pub trait RetryableOperation: Send + Sync + 'static {
    type Payload: Clone + fmt::Debug + Send + Sync + 'static;

    /// Name used for the queued task and in logs.
    fn name(&self, payload: &Self::Payload) -> String;

    /// Run one attempt. `Ok(Some(url))` is a usable result; `Ok(None)` is a
    /// soft failure.
    async fn attempt(&self, state: &RetryState<Self::Payload>)
    -> Result<Option<String>, TaskError>;
}

/// Submits retryable operations and requeues them on failure.
#[derive(Clone)]
pub struct Requeuer {
    queue: TaskQueue,
    decider: Arc<dyn Decider>,
    events: Arc<dyn EventSink>,
}

impl Requeuer {
    pub fn new(queue: TaskQueue, decider: Arc<dyn Decider>, events: Arc<dyn EventSink>) -> Self {
        Self {
            queue,
            decider,
            events,
        }
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Queue one attempt of `op` described by `state`.
    pub fn submit<O: RetryableOperation>(
        &self,
        op: Arc<O>,
        state: RetryState<O::Payload>,
    ) -> Result<TaskId, QueueError> {
        let name = op.name(&state.payload);
        let this = self.clone();
        self.queue
            .submit(Task::new(name, move || this.run_attempt(op, state)))
    }

    fn run_attempt<O: RetryableOperation>(
        self,
        op: Arc<O>,
        state: RetryState<O::Payload>,
    ) -> TaskFuture {
        Box::pin(async move {
            let operation = op.name(&state.payload);
            let operation_id = state.operation_id;
            let attempt = state.attempt;

            let outcome = AttemptOutcome::from_result(op.attempt(&state).await);
            if let AttemptOutcome::Produced(url) = &outcome {
                self.events.emit(DomainEvent::AttemptProduced {
                    operation: operation.clone(),
                    operation_id,
                    attempt,
                    url: url.clone(),
                });
            }

            match next_action(self.decider.as_ref(), state, &outcome) {
                NextAction::Done => Ok(()),
                NextAction::Requeue(next) => {
                    self.events.emit(DomainEvent::AttemptRequeued {
                        operation: operation.clone(),
                        operation_id,
                        next_attempt: next.attempt,
                        reason: outcome.to_string(),
                    });
                    match self.submit(op, next) {
                        Ok(_) => Ok(()),
                        Err(err) => {
                            self.events.emit(DomainEvent::AttemptDropped {
                                operation,
                                operation_id,
                                attempts: attempt + 1,
                                reason: err.to_string(),
                            });
                            Err(TaskError::Requeue(err))
                        }
                    }
                }
                NextAction::Drop { state, reason } => {
                    self.events.emit(DomainEvent::AttemptDropped {
                        operation: operation.clone(),
                        operation_id,
                        attempts: state.executions(),
                        reason: reason.clone(),
                    });
                    Err(TaskError::RetryExhausted {
                        operation,
                        attempts: state.executions(),
                        reason,
                    })
                }
            }
        })
    }
}
