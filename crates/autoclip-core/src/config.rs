//! Daemon configuration.
//!
//! Every knob has a default and can be overridden with an `AUTOCLIP_*`
//! environment variable. A value that is set but does not parse is an error
//! rather than a silent fallback.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::app::{DEFAULT_CYCLE_INTERVAL, DEFAULT_WORKERS};
use crate::domain::AspectRatio;
use crate::impls::PollSchedule;
use crate::queue::{DEFAULT_CAPACITY, RetryPolicy};

pub const ENV_QUEUE_CAPACITY: &str = "AUTOCLIP_QUEUE_CAPACITY";
pub const ENV_WORKERS: &str = "AUTOCLIP_WORKERS";
pub const ENV_MAX_RETRIES: &str = "AUTOCLIP_MAX_RETRIES";
pub const ENV_CYCLE_INTERVAL_SECS: &str = "AUTOCLIP_CYCLE_INTERVAL_SECS";
pub const ENV_ASPECT_RATIO: &str = "AUTOCLIP_ASPECT_RATIO";
pub const ENV_POLL_INTERVAL_SECS: &str = "AUTOCLIP_POLL_INTERVAL_SECS";
pub const ENV_POLL_TIMEOUT_SECS: &str = "AUTOCLIP_POLL_TIMEOUT_SECS";
pub const ENV_SIMULATED_FAILURE_RATE: &str = "AUTOCLIP_SIMULATED_FAILURE_RATE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must be at least 1")]
    Zero { key: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub queue_capacity: usize,
    pub workers: usize,
    pub retry_policy: RetryPolicy,
    pub cycle_interval: Duration,
    /// Ratio requested for text-to-video.
    pub aspect_ratio: AspectRatio,
    pub poll_schedule: PollSchedule,
    /// Probability that a simulated generator job ends without a video.
    pub simulated_failure_rate: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_CAPACITY,
            workers: DEFAULT_WORKERS,
            retry_policy: RetryPolicy::default(),
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            aspect_ratio: AspectRatio::default(),
            poll_schedule: PollSchedule::default(),
            simulated_failure_rate: 0.2,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let queue_capacity = parse_or(&lookup, ENV_QUEUE_CAPACITY, defaults.queue_capacity)?;
        if queue_capacity == 0 {
            return Err(ConfigError::Zero {
                key: ENV_QUEUE_CAPACITY,
            });
        }
        let workers = parse_or(&lookup, ENV_WORKERS, defaults.workers)?;
        if workers == 0 {
            return Err(ConfigError::Zero { key: ENV_WORKERS });
        }

        let max_retries = parse_or(
            &lookup,
            ENV_MAX_RETRIES,
            defaults.retry_policy.max_retries,
        )?;
        let cycle_interval = secs_or(&lookup, ENV_CYCLE_INTERVAL_SECS, defaults.cycle_interval)?;
        let aspect_ratio = parse_or(&lookup, ENV_ASPECT_RATIO, defaults.aspect_ratio)?;
        let poll_schedule = PollSchedule::new(
            secs_or(&lookup, ENV_POLL_INTERVAL_SECS, defaults.poll_schedule.interval)?,
            secs_or(&lookup, ENV_POLL_TIMEOUT_SECS, defaults.poll_schedule.timeout)?,
        );

        let simulated_failure_rate = parse_or(
            &lookup,
            ENV_SIMULATED_FAILURE_RATE,
            defaults.simulated_failure_rate,
        )?;
        if !(0.0..=1.0).contains(&simulated_failure_rate) {
            return Err(ConfigError::Invalid {
                key: ENV_SIMULATED_FAILURE_RATE,
                value: simulated_failure_rate.to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }

        Ok(Self {
            queue_capacity,
            workers,
            retry_policy: RetryPolicy::new(max_retries),
            cycle_interval,
            aspect_ratio,
            poll_schedule,
            simulated_failure_rate,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn secs_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}
