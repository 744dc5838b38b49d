//! Decision model: what to do after an attempt.
//!
//! `Decider` は副作用のない純粋関数。実際の requeue は `app::retry` が行う。

use super::{AttemptOutcome, RetryState};
use crate::queue::RetryPolicy;

/// What the policy decided for an attempt, independent of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Usable result; nothing more to do.
    Done,

    /// Schedule one more attempt.
    Retry,

    /// Give up on the operation.
    Drop { reason: String },
}

/// The next action for a concrete retry state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction<P> {
    Done,
    Requeue(RetryState<P>),
    Drop { state: RetryState<P>, reason: String },
}

/// Decides the next action from the attempt number and its outcome.
pub trait Decider: Send + Sync {
    fn decide(&self, attempt: u32, outcome: &AttemptOutcome) -> Decision;
}

/// Attempt-count based decider.
///
/// Error kinds are not distinguished: a timeout, a malformed response and an
/// empty result all consume one retry.
#[derive(Debug, Clone)]
pub struct DefaultDecider {
    retry_policy: RetryPolicy,
}

impl DefaultDecider {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self { retry_policy }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

impl Default for DefaultDecider {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl Decider for DefaultDecider {
    fn decide(&self, attempt: u32, outcome: &AttemptOutcome) -> Decision {
        if outcome.is_success() {
            Decision::Done
        } else if self.retry_policy.allows_retry(attempt) {
            Decision::Retry
        } else {
            Decision::Drop {
                reason: format!(
                    "too many retries ({}/{}), last outcome: {}",
                    attempt, self.retry_policy.max_retries, outcome
                ),
            }
        }
    }
}

/// Apply a decider to a retry state.
pub fn next_action<P>(
    decider: &dyn Decider,
    state: RetryState<P>,
    outcome: &AttemptOutcome,
) -> NextAction<P> {
    match decider.decide(state.attempt, outcome) {
        Decision::Done => NextAction::Done,
        Decision::Retry => NextAction::Requeue(state.next()),
        Decision::Drop { reason } => NextAction::Drop { state, reason },
    }
}
