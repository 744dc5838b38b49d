//! Remote job polling shared by the provider clients.
//!
//! Providers accept a generation request, hand back a job id, and expect the
//! caller to poll until the job completes. The poll loop keeps the calling
//! worker busy for the whole wait, up to `timeout`.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::ports::CollaboratorError;

/// Status reported by one poll of a remote job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus<T> {
    /// Still running; the string is the provider's state label.
    Pending(String),
    Ready(T),
    Failed(String),
}

/// Poll pacing for one remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSchedule {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for PollSchedule {
    /// 30s between polls, give up after 10 minutes.
    fn default() -> Self {
        Self::new(Duration::from_secs(30), Duration::from_secs(600))
    }
}

/// Poll `check` every `schedule.interval` until the job is ready, failed, or
/// `schedule.timeout` has elapsed.
///
/// The first poll happens one interval after the call.
pub async fn poll_job<T, F, Fut>(
    provider: &str,
    schedule: &PollSchedule,
    mut check: F,
) -> Result<T, CollaboratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStatus<T>, CollaboratorError>>,
{
    let started = Instant::now();
    loop {
        if started.elapsed() > schedule.timeout {
            return Err(CollaboratorError::Timeout {
                provider: provider.to_string(),
                waited: schedule.timeout,
            });
        }

        tokio::time::sleep(schedule.interval).await;

        match check().await? {
            PollStatus::Ready(value) => {
                info!(provider, elapsed = ?started.elapsed(), "remote job completed");
                return Ok(value);
            }
            PollStatus::Failed(reason) => {
                return Err(CollaboratorError::JobFailed {
                    provider: provider.to_string(),
                    reason,
                });
            }
            PollStatus::Pending(state) => {
                debug!(provider, state = %state, "remote job still running");
            }
        }
    }
}
