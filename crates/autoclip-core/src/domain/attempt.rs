//! Retry state carried by value from one attempt to the next.

use serde::{Deserialize, Serialize};

use super::ids::OperationId;

/// State of one logical operation across its attempts.
///
/// The queue never shares this between tasks: each requeued task owns
/// its own copy with `attempt` bumped by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryState<P> {
    pub operation_id: OperationId,

    /// 0 for the first execution.
    pub attempt: u32,

    pub payload: P,
}

impl<P> RetryState<P> {
    /// State for the first execution of a new operation.
    pub fn first(payload: P) -> Self {
        Self {
            operation_id: OperationId::generate(),
            attempt: 0,
            payload,
        }
    }

    /// State for the next attempt of the same operation.
    pub fn next(self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self
        }
    }

    /// Number of executions including the current one.
    pub fn executions(&self) -> u32 {
        self.attempt + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_keeps_operation_and_bumps_attempt() {
        let first = RetryState::first("payload");
        let id = first.operation_id;

        let second = first.next();
        assert_eq!(second.operation_id, id);
        assert_eq!(second.attempt, 1);
        assert_eq!(second.executions(), 2);
        assert_eq!(second.payload, "payload");
    }
}
