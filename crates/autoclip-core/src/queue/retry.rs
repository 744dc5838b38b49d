//! Retry policy: how many times a failed operation may be requeued.

/// Retry ceiling for requeued operations.
///
/// `max_retries` counts requeues beyond the first try, so an operation runs
/// at most `max_retries + 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 1;

    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// May an operation that just finished attempt `attempt` (0-indexed) run again?
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    pub fn max_executions(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_allows_one_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.max_executions(), 2);
    }

    #[rstest]
    #[case::first_try(0, true)]
    #[case::after_retry(1, false)]
    #[case::past_ceiling(5, false)]
    fn allows_retry_below_ceiling(#[case] attempt: u32, #[case] expected: bool) {
        assert_eq!(RetryPolicy::default().allows_retry(attempt), expected);
    }
}
