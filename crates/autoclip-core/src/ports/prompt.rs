//! Prompt generation port.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CollaboratorError;

/// Which prompt a flow needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// A full scene description for text-to-video.
    TextToVideo,
    /// An image prompt for a still that will be animated.
    Image,
    /// A portrait image prompt.
    Portrait,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PromptKind::TextToVideo => "text_to_video",
            PromptKind::Image => "image",
            PromptKind::Portrait => "portrait",
        })
    }
}

/// Produces prompt text. Usually backed by an LLM call.
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn prompt(&self, kind: PromptKind) -> Result<String, CollaboratorError>;

    /// Describe the motion for animating an already generated image.
    async fn describe_scene(
        &self,
        image_url: &str,
        seed_prompt: &str,
    ) -> Result<String, CollaboratorError>;
}
