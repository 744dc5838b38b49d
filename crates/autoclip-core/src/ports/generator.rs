//! Media generator ports.
//!
//! Implementations usually submit a remote job and poll it, holding the
//! calling worker for the whole wait (see `impls::polling`).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CollaboratorError;
use crate::domain::AspectRatio;

/// Which inputs a video generator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Text-to-video and image-to-video.
    Universal,
    /// Needs a source image.
    ImageOnly,
}

/// What a flow is about to feed a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    Text,
    Image,
}

impl InputMode {
    pub fn accepts(self, capability: Capability) -> bool {
        match self {
            InputMode::Text => capability == Capability::Universal,
            InputMode::Image => true,
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputMode::Text => "text",
            InputMode::Image => "image",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image_url: Option<String>,
    pub aspect_ratio: AspectRatio,
}

/// A video provider.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn capability(&self) -> Capability;

    /// Returns the video URL, or `None` when the job finished without one.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<String>, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    pub aspect_ratio: AspectRatio,
}

/// A still-image provider.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(InputMode::Text, Capability::Universal, true)]
    #[case(InputMode::Text, Capability::ImageOnly, false)]
    #[case(InputMode::Image, Capability::Universal, true)]
    #[case(InputMode::Image, Capability::ImageOnly, true)]
    fn input_mode_accepts(
        #[case] mode: InputMode,
        #[case] capability: Capability,
        #[case] expected: bool,
    ) {
        assert_eq!(mode.accepts(capability), expected);
    }
}
