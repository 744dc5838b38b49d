//! WorkerPool - 固定数のワーカーでキューを消化する
//!
//! Each worker loops `take -> run -> mark_done`. Task execution is sealed:
//! the task future runs in its own tokio task, so an error or a panic ends
//! up as a value in the worker and never unwinds through the loop.
//! `mark_done` is issued by a drop guard, so every taken task is marked
//! exactly once.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::DomainEvent;
use crate::ports::EventSink;
use crate::queue::{Task, TaskQueue};

/// Default number of workers, and so of external jobs in flight.
pub const DEFAULT_WORKERS: usize = 3;

/// Handle to the running workers.
/// - `request_shutdown()` stops workers from taking new tasks
/// - `shutdown_and_join()` also waits for them to exit
pub struct WorkerPool {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `n` workers over `queue`.
    pub fn spawn(n: usize, queue: TaskQueue, events: Arc<dyn EventSink>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let joins = (0..n)
            .map(|worker_id| {
                let queue = queue.clone();
                let events = Arc::clone(&events);
                let rx = shutdown_rx.clone();
                tokio::spawn(worker_loop(worker_id, queue, events, rx))
            })
            .collect();

        Self { shutdown_tx, joins }
    }

    pub fn size(&self) -> usize {
        self.joins.len()
    }

    /// Stop taking new tasks. In-flight tasks run to completion.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            let _ = join.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: TaskQueue,
    events: Arc<dyn EventSink>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(worker = worker_id, "worker started");
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let task = tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            task = queue.take() => task,
        };

        let _done = DoneGuard {
            queue: &queue,
            worker_id,
        };
        run_sealed(worker_id, task, events.as_ref()).await;
    }
    info!(worker = worker_id, "worker stopped");
}

/// Marks the taken task done when dropped.
struct DoneGuard<'a> {
    queue: &'a TaskQueue,
    worker_id: usize,
}

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.queue.mark_done() {
            error!(worker = self.worker_id, error = %e, "mark_done failed");
        }
    }
}

/// Run one task to completion and report how it ended.
async fn run_sealed(worker_id: usize, task: Task, events: &dyn EventSink) {
    let task_id = task.id();
    let name = task.name().to_string();
    events.emit(DomainEvent::TaskStarted {
        worker: worker_id,
        task_id,
        task: name.clone(),
    });

    let event = match tokio::spawn(task.into_future()).await {
        Ok(Ok(())) => DomainEvent::TaskSucceeded {
            worker: worker_id,
            task_id,
            task: name,
        },
        Ok(Err(err)) => DomainEvent::TaskFailed {
            worker: worker_id,
            task_id,
            task: name,
            dropped: err.is_drop(),
            error: err.to_string(),
        },
        Err(join_err) => {
            let error = if join_err.is_panic() {
                format!("panicked: {}", panic_message(join_err.into_panic()))
            } else {
                join_err.to_string()
            };
            DomainEvent::TaskFailed {
                worker: worker_id,
                task_id,
                task: name,
                error,
                dropped: false,
            }
        }
    };
    events.emit(event);
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::error::TaskError;
    use crate::impls::RecordingEventSink;
    use crate::queue::DEFAULT_CAPACITY;

    fn setup() -> (TaskQueue, Arc<RecordingEventSink>) {
        let sink = Arc::new(RecordingEventSink::default());
        let queue = TaskQueue::with_events(DEFAULT_CAPACITY, sink.clone());
        (queue, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn never_runs_more_than_pool_size_at_once() {
        let (queue, sink) = setup();
        let pool = WorkerPool::spawn(DEFAULT_WORKERS, queue.clone(), sink.clone());

        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        for i in 0..8 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            queue
                .submit(Task::new(format!("slow-{i}"), move || async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }))
                .unwrap();
        }

        queue.wait_until_idle().await;
        assert_eq!(peak.load(Ordering::SeqCst), DEFAULT_WORKERS);
        assert_eq!(sink.count("task_succeeded"), 8);
        assert_eq!(queue.counts().completed, 8);

        pool.shutdown_and_join().await;
    }

    async fn explode() -> Result<(), TaskError> {
        panic!("provider client bug")
    }

    #[tokio::test]
    async fn errors_and_panics_do_not_stop_the_worker() {
        let (queue, sink) = setup();
        let pool = WorkerPool::spawn(1, queue.clone(), sink.clone());

        queue.submit(Task::new("panics", explode)).unwrap();
        queue
            .submit(Task::new("fails", || async {
                Err(TaskError::Other("bad gateway".to_string()))
            }))
            .unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        queue
            .submit(Task::new("succeeds", move || async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), queue.wait_until_idle())
            .await
            .expect("single worker should survive and drain the queue");

        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(sink.count("task_failed"), 2);
        assert_eq!(sink.count("task_succeeded"), 1);
        assert!(sink.events().iter().any(|e| matches!(
            e,
            DomainEvent::TaskFailed { error, .. } if error.contains("provider client bug")
        )));

        pool.shutdown_and_join().await;
    }

    #[tokio::test]
    async fn retry_exhaustion_is_reported_as_a_drop() {
        let (queue, sink) = setup();
        let pool = WorkerPool::spawn(1, queue.clone(), sink.clone());

        queue
            .submit(Task::new("gives-up", || async {
                Err(TaskError::RetryExhausted {
                    operation: "text-to-video".to_string(),
                    attempts: 2,
                    reason: "no result".to_string(),
                })
            }))
            .unwrap();
        queue.wait_until_idle().await;

        assert!(sink.events().iter().any(|e| matches!(
            e,
            DomainEvent::TaskFailed { dropped: true, .. }
        )));
        pool.shutdown_and_join().await;
    }

    #[tokio::test]
    async fn shutdown_stops_taking_new_tasks() {
        let (queue, sink) = setup();
        let pool = WorkerPool::spawn(2, queue.clone(), sink.clone());
        assert_eq!(pool.size(), 2);

        tokio::time::timeout(Duration::from_secs(1), pool.shutdown_and_join())
            .await
            .expect("idle workers should exit on shutdown");

        queue
            .submit(Task::new("after-shutdown", || async { Ok(()) }))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(queue.counts().waiting, 1);
        assert_eq!(sink.count("task_started"), 0);
    }
}
