//! EventSink port - ドメインイベントの出口

use crate::domain::DomainEvent;

/// Receives domain events. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}
