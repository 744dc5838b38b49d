//! Domain model (ids, retry state, outcomes, decisions, events).

pub mod attempt;
pub mod decision;
pub mod events;
pub mod ids;
pub mod media;
pub mod outcome;

pub use attempt::RetryState;
pub use decision::{Decider, Decision, DefaultDecider, NextAction, next_action};
pub use events::DomainEvent;
pub use ids::{OperationId, TaskId};
pub use media::{AspectRatio, GenerationKind, UnknownAspectRatio};
pub use outcome::AttemptOutcome;
