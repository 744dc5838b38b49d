//! QuiescenceMonitor - キューが空になるたびに通知する
//!
//! Emits one `Quiescent` event per busy-to-idle transition of the queue.
//! While the queue stays idle nothing is emitted.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::DomainEvent;
use crate::ports::EventSink;
use crate::queue::TaskQueue;

pub struct QuiescenceMonitor {
    queue: TaskQueue,
    events: Arc<dyn EventSink>,
}

impl QuiescenceMonitor {
    pub fn new(queue: TaskQueue, events: Arc<dyn EventSink>) -> Self {
        Self { queue, events }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs forever; abort the task to stop it.
    pub async fn run(self) {
        let mut seen = self.queue.counts().drains;
        loop {
            let counts = self.queue.wait_for_drain(seen).await;
            seen = counts.drains;
            self.events.emit(DomainEvent::Quiescent { counts });
        }
    }
}
