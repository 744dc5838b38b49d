//! Ports - 外部コラボレーターとの境界
//!
//! Each trait hides one external collaborator: prompt generation, video and
//! image providers, cover extraction, the publishing backend, and the event
//! sink. The queue core never calls these directly; only the generation
//! pipeline does.

pub mod event_sink;
pub mod generator;
pub mod prompt;
pub mod publish;

pub use self::event_sink::EventSink;
pub use self::generator::{
    Capability, GeneratedImage, GenerationRequest, ImageGenerator, InputMode, VideoGenerator,
};
pub use self::prompt::{PromptKind, PromptSource};
pub use self::publish::{CoverExtractor, Publisher};

use std::time::Duration;

use thiserror::Error;

/// Errors reported by external collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("{provider}: request failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider}: job did not finish within {waited:?}")]
    Timeout { provider: String, waited: Duration },

    #[error("{provider}: job failed: {reason}")]
    JobFailed { provider: String, reason: String },

    #[error("{provider}: job finished without a result")]
    EmptyResult { provider: String },
}

impl CollaboratorError {
    pub fn request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        CollaboratorError::Request {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            CollaboratorError::Request { provider, .. }
            | CollaboratorError::Timeout { provider, .. }
            | CollaboratorError::JobFailed { provider, .. }
            | CollaboratorError::EmptyResult { provider } => provider,
        }
    }
}
