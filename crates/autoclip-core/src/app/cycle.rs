//! CycleDriver - 定期的に生成タスクを投入する
//!
//! Every `interval` the fixed set of top-level operations is submitted at
//! attempt 0. The driver does not wait for the previous cycle to finish; a
//! full queue simply rejects the overflow.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::retry::{Requeuer, RetryableOperation};
use crate::domain::RetryState;

/// Default pause between cycles: 30 minutes.
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// What one cycle managed to enqueue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub enqueued: usize,
    pub rejected: usize,
}

pub struct CycleDriver<O: RetryableOperation> {
    requeuer: Requeuer,
    op: Arc<O>,
    payloads: Vec<O::Payload>,
    interval: Duration,
    cycles: u64,
}

impl<O: RetryableOperation> CycleDriver<O> {
    pub fn new(requeuer: Requeuer, op: Arc<O>, payloads: Vec<O::Payload>) -> Self {
        Self {
            requeuer,
            op,
            payloads,
            interval: DEFAULT_CYCLE_INTERVAL,
            cycles: 0,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Submit one cycle's operations.
    pub fn enqueue_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let mut report = CycleReport {
            cycle: self.cycles,
            started_at: Utc::now(),
            enqueued: 0,
            rejected: 0,
        };
        info!(cycle = report.cycle, "starting a new generation cycle");

        for payload in &self.payloads {
            let state = RetryState::first(payload.clone());
            match self.requeuer.submit(Arc::clone(&self.op), state) {
                Ok(_) => report.enqueued += 1,
                Err(_) => report.rejected += 1,
            }
        }

        if report.rejected > 0 {
            warn!(
                cycle = report.cycle,
                enqueued = report.enqueued,
                rejected = report.rejected,
                "cycle partially enqueued"
            );
        } else {
            info!(
                cycle = report.cycle,
                enqueued = report.enqueued,
                "cycle enqueued"
            );
        }
        report
    }

    /// Run cycles until `shutdown` turns true or its sender is dropped.
    /// The first cycle starts immediately.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.interval, "generation loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.enqueue_cycle();
                }
            }
        }
        info!(cycles = self.cycles, "generation loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::domain::DefaultDecider;
    use crate::error::TaskError;
    use crate::impls::RecordingEventSink;
    use crate::queue::TaskQueue;

    #[derive(Default)]
    struct Counting {
        attempts: AtomicU32,
    }

    #[async_trait]
    impl RetryableOperation for Counting {
        type Payload = u8;

        fn name(&self, payload: &u8) -> String {
            format!("op-{payload}")
        }

        async fn attempt(&self, _: &RetryState<u8>) -> Result<Option<String>, TaskError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(Some("done".to_string()))
        }
    }

    fn driver(capacity: usize) -> (CycleDriver<Counting>, TaskQueue) {
        let sink = Arc::new(RecordingEventSink::default());
        let queue = TaskQueue::with_events(capacity, sink.clone());
        let requeuer = Requeuer::new(queue.clone(), Arc::new(DefaultDecider::default()), sink);
        let op = Arc::new(Counting::default());
        (CycleDriver::new(requeuer, op, vec![1, 2, 3]), queue)
    }

    #[test]
    fn enqueue_cycle_submits_every_payload_at_attempt_zero() {
        let (mut driver, queue) = driver(10);

        let report = driver.enqueue_cycle();

        assert_eq!(report.cycle, 1);
        assert_eq!(report.enqueued, 3);
        assert_eq!(report.rejected, 0);
        assert_eq!(queue.counts().waiting, 3);
    }

    #[test]
    fn overflow_is_counted_as_rejected() {
        let (mut driver, queue) = driver(4);

        let first = driver.enqueue_cycle();
        let second = driver.enqueue_cycle();

        assert_eq!(first.enqueued, 3);
        assert_eq!((second.cycle, second.enqueued, second.rejected), (2, 1, 2));
        assert_eq!(queue.counts().rejected, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_immediately_then_every_interval() {
        let (driver, queue) = driver(100);
        let driver = driver.with_interval(Duration::from_secs(1800));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(driver.run(rx));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(queue.counts().submitted, 3);

        tokio::time::sleep(Duration::from_secs(1800)).await;
        assert_eq!(queue.counts().submitted, 6);

        tx.send(true).unwrap();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(queue.counts().submitted, 6);
    }

    #[tokio::test]
    async fn run_stops_when_sender_is_dropped() {
        let (driver, _queue) = driver(10);
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(driver.run(rx));
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
