//! Bounded in-memory task queue shared by the cycle driver, the retry
//! wrapper and the worker pool.
//!
//! All state sits behind one mutex. Workers wait on a `Notify` for new
//! tasks; idle watchers wait on a `watch` channel carrying the latest
//! `QueueCounts`, which is only ever updated while the mutex is held.

mod retry;
mod state;
mod task;

pub use retry::RetryPolicy;
pub use task::{Task, TaskFuture};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Notify, watch};
use tracing::debug;

use self::state::QueueState;
use crate::domain::{DomainEvent, TaskId};
use crate::error::QueueError;
use crate::impls::TracingEventSink;
use crate::observability::QueueCounts;
use crate::ports::EventSink;

/// Default number of waiting tasks the queue accepts.
pub const DEFAULT_CAPACITY: usize = 10;

struct Shared {
    capacity: usize,
    state: Mutex<QueueState>,
    /// Signalled once per successful submit.
    available: Notify,
    counts_tx: watch::Sender<QueueCounts>,
    events: Arc<dyn EventSink>,
}

/// Handle to the bounded queue. Cheap to clone; all clones share one queue.
#[derive(Clone)]
pub struct TaskQueue {
    shared: Arc<Shared>,
}

impl TaskQueue {
    /// Queue reporting rejections through the tracing sink.
    pub fn new(capacity: usize) -> Self {
        Self::with_events(capacity, Arc::new(TracingEventSink))
    }

    pub fn with_events(capacity: usize, events: Arc<dyn EventSink>) -> Self {
        let (counts_tx, _) = watch::channel(QueueCounts::default());
        Self {
            shared: Arc::new(Shared {
                capacity,
                state: Mutex::new(QueueState::default()),
                available: Notify::new(),
                counts_tx,
                events,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Append a task at the tail without blocking.
    ///
    /// Fails with `QueueFull` when `capacity` tasks are already waiting; the
    /// task is dropped and the queue is left as it was.
    pub fn submit(&self, task: Task) -> Result<TaskId, QueueError> {
        let task_id = task.id();
        let rejected = {
            let mut state = self.lock();
            match state.push(task, self.shared.capacity) {
                Ok(()) => {
                    self.publish(&state);
                    None
                }
                Err(task) => {
                    self.publish(&state);
                    Some(task.name().to_string())
                }
            }
        };

        if let Some(task) = rejected {
            self.shared.events.emit(DomainEvent::TaskRejected {
                task: task.clone(),
                capacity: self.shared.capacity,
            });
            return Err(QueueError::QueueFull {
                capacity: self.shared.capacity,
                task,
            });
        }

        debug!(task_id = %task_id, "enqueued task");
        self.shared.available.notify_one();
        Ok(task_id)
    }

    /// Wait for a task and remove it from the head of the queue.
    ///
    /// The caller owns the task until it calls `mark_done`.
    pub async fn take(&self) -> Task {
        loop {
            let task = {
                let mut state = self.lock();
                let task = state.pop();
                if task.is_some() {
                    self.publish(&state);
                }
                task
            };

            if let Some(task) = task {
                return task;
            }

            // notify_one は待機者がいなければ permit を残すので取りこぼさない
            self.shared.available.notified().await;
        }
    }

    /// Record that one taken task has finished, whatever its outcome.
    pub fn mark_done(&self) -> Result<(), QueueError> {
        let mut state = self.lock();
        let drained = state.finish()?;
        self.publish(&state);
        if drained {
            debug!(drains = state.counts().drains, "queue drained");
        }
        Ok(())
    }

    /// Wait until nothing is waiting or in flight. Returns at once if the
    /// queue is already idle.
    pub async fn wait_until_idle(&self) {
        let mut rx = self.shared.counts_tx.subscribe();
        // `self` keeps the sender alive, so the channel cannot close here.
        let _ = rx.wait_for(QueueCounts::is_idle).await;
    }

    /// Wait for the next drain after drain number `seen` and return the
    /// counts observed at that point.
    ///
    /// Several drains that happen before the caller wakes are reported once.
    pub async fn wait_for_drain(&self, seen: u64) -> QueueCounts {
        let mut rx = self.shared.counts_tx.subscribe();
        match rx.wait_for(|counts| counts.drains > seen).await {
            Ok(counts) => *counts,
            Err(_) => self.counts(),
        }
    }

    pub fn counts(&self) -> QueueCounts {
        self.lock().counts()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // counters stay consistent even if a holder panicked
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &QueueState) {
        self.shared.counts_tx.send_replace(state.counts());
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("capacity", &self.shared.capacity)
            .field("counts", &self.counts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::impls::RecordingEventSink;

    fn noop(name: &str) -> Task {
        Task::new(name, || async { Ok(()) })
    }

    #[tokio::test]
    async fn take_returns_tasks_in_fifo_order() {
        let queue = TaskQueue::new(DEFAULT_CAPACITY);
        for name in ["a", "b", "c"] {
            queue.submit(noop(name)).unwrap();
        }

        let mut names = Vec::new();
        for _ in 0..3 {
            let task = queue.take().await;
            names.push(task.name().to_string());
            queue.mark_done().unwrap();
        }
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn twelve_back_to_back_submissions_reject_the_last_two() {
        let sink = Arc::new(RecordingEventSink::default());
        let queue = TaskQueue::with_events(10, sink.clone());

        let results: Vec<_> = (0..12)
            .map(|i| queue.submit(noop(&format!("t{i}"))))
            .collect();

        assert!(results[..10].iter().all(Result::is_ok));
        for (i, result) in results[10..].iter().enumerate() {
            assert_eq!(
                result,
                &Err(QueueError::QueueFull {
                    capacity: 10,
                    task: format!("t{}", i + 10),
                })
            );
        }
        assert_eq!(sink.count("task_rejected"), 2);

        // 先頭は壊れていない
        assert_eq!(queue.take().await.name(), "t0");
        let counts = queue.counts();
        assert_eq!(counts.waiting, 9);
        assert_eq!(counts.in_flight, 1);
        assert_eq!(counts.rejected, 2);
    }

    #[tokio::test]
    async fn submit_after_take_frees_a_slot() {
        let queue = TaskQueue::new(1);
        queue.submit(noop("a")).unwrap();
        assert!(queue.submit(noop("b")).is_err());

        let _a = queue.take().await;
        queue.submit(noop("c")).unwrap();
        assert_eq!(queue.counts().outstanding(), 2);
    }

    #[tokio::test]
    async fn take_waits_for_a_submission() {
        let queue = TaskQueue::new(DEFAULT_CAPACITY);
        let taker = tokio::spawn({
            let queue = queue.clone();
            async move { queue.take().await.name().to_string() }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!taker.is_finished());

        queue.submit(noop("late")).unwrap();
        assert_eq!(taker.await.unwrap(), "late");
    }

    #[tokio::test]
    async fn each_task_goes_to_exactly_one_taker() {
        let queue = TaskQueue::new(DEFAULT_CAPACITY);
        let takers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut got = Vec::new();
                    while got.len() < 2 {
                        got.push(queue.take().await.id());
                        queue.mark_done().unwrap();
                    }
                    got
                })
            })
            .collect();

        let mut submitted = Vec::new();
        for i in 0..6 {
            submitted.push(queue.submit(noop(&format!("t{i}"))).unwrap());
        }

        let mut taken = Vec::new();
        for taker in takers {
            taken.extend(taker.await.unwrap());
        }
        taken.sort();
        submitted.sort();
        assert_eq!(taken, submitted);
    }

    #[test]
    fn mark_done_without_take_is_rejected() {
        let queue = TaskQueue::new(DEFAULT_CAPACITY);
        assert_eq!(queue.mark_done(), Err(QueueError::NothingInFlight));
        assert!(queue.counts().is_idle());
    }

    #[tokio::test]
    async fn wait_until_idle_returns_immediately_when_empty() {
        let queue = TaskQueue::new(DEFAULT_CAPACITY);
        tokio::time::timeout(Duration::from_millis(50), queue.wait_until_idle())
            .await
            .expect("idle queue should not block");
    }

    #[tokio::test]
    async fn wait_until_idle_blocks_while_work_is_outstanding() {
        let queue = TaskQueue::new(DEFAULT_CAPACITY);
        queue.submit(noop("a")).unwrap();
        queue.submit(noop("b")).unwrap();

        let waiter = tokio::spawn({
            let queue = queue.clone();
            async move { queue.wait_until_idle().await }
        });

        let _a = queue.take().await;
        queue.mark_done().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "b is still waiting");

        let _b = queue.take().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "b is still in flight");

        queue.mark_done().unwrap();
        tokio::time::timeout(Duration::from_millis(100), waiter)
            .await
            .expect("waiter should wake once drained")
            .unwrap();

        // callable again; already idle so returns at once
        queue.wait_until_idle().await;
    }

    #[tokio::test]
    async fn wait_for_drain_waits_for_the_next_transition() {
        let queue = TaskQueue::new(DEFAULT_CAPACITY);
        let seen = queue.counts().drains;

        let watcher = tokio::spawn({
            let queue = queue.clone();
            async move { queue.wait_for_drain(seen).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!watcher.is_finished(), "idle at start is not a drain");

        queue.submit(noop("a")).unwrap();
        let _a = queue.take().await;
        queue.mark_done().unwrap();

        let counts = watcher.await.unwrap();
        assert_eq!(counts.drains, seen + 1);
        assert_eq!(counts.completed, 1);
    }
}
