//! GenerationPipeline - 動画生成フロー
//!
//! One attempt of a generation flow: prompt, (image), video, cover, import.
//! A missing video URL is a soft failure returned as `Ok(None)`; the
//! requeuer decides whether to try again. Import failures are logged and
//! do not fail the attempt.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::generators::GeneratorRegistry;
use super::retry::RetryableOperation;
use crate::domain::{AspectRatio, GenerationKind, RetryState};
use crate::error::TaskError;
use crate::ports::{
    CoverExtractor, GenerationRequest, ImageGenerator, InputMode, PromptKind, PromptSource,
    Publisher,
};

/// Collaborators used by the generation flows.
#[derive(Clone)]
pub struct GenerationPipeline {
    prompts: Arc<dyn PromptSource>,
    generators: GeneratorRegistry,
    images: Arc<dyn ImageGenerator>,
    covers: Arc<dyn CoverExtractor>,
    publisher: Arc<dyn Publisher>,
    aspect_ratio: AspectRatio,
}

impl GenerationPipeline {
    pub fn new(
        prompts: Arc<dyn PromptSource>,
        generators: GeneratorRegistry,
        images: Arc<dyn ImageGenerator>,
        covers: Arc<dyn CoverExtractor>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            prompts,
            generators,
            images,
            covers,
            publisher,
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Aspect ratio for text-to-video. Image flows use the image's own ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    async fn text_to_video(&self) -> Result<Option<String>, TaskError> {
        let description = self.prompts.prompt(PromptKind::TextToVideo).await?;
        let generator = self.generators.choose(InputMode::Text)?;
        let request = GenerationRequest {
            prompt: description.clone(),
            image_url: None,
            aspect_ratio: self.aspect_ratio,
        };

        let Some(video_url) = generator.generate(&request).await? else {
            warn!(
                flow = %GenerationKind::TextToVideo,
                generator = generator.name(),
                "no video url returned"
            );
            return Ok(None);
        };
        info!(
            flow = %GenerationKind::TextToVideo,
            generator = generator.name(),
            prompt = %description,
            video_url = %video_url,
            "video generated"
        );

        let cover_url = self.covers.cover_for(&video_url).await?;
        self.publish(generator.name(), &cover_url, &video_url).await;
        Ok(Some(video_url))
    }

    async fn image_to_video(
        &self,
        kind: GenerationKind,
        prompt_kind: PromptKind,
    ) -> Result<Option<String>, TaskError> {
        let prompt = self.prompts.prompt(prompt_kind).await?;
        let image = self.images.generate_image(&prompt).await?;
        let description = self.prompts.describe_scene(&image.url, &prompt).await?;
        let generator = self.generators.choose(InputMode::Image)?;
        let request = GenerationRequest {
            prompt: description.clone(),
            image_url: Some(image.url.clone()),
            aspect_ratio: image.aspect_ratio,
        };

        let Some(video_url) = generator.generate(&request).await? else {
            warn!(flow = %kind, generator = generator.name(), "no video url returned");
            return Ok(None);
        };
        info!(
            flow = %kind,
            generator = generator.name(),
            prompt = %description,
            video_url = %video_url,
            "video generated"
        );

        // the source image doubles as the cover
        self.publish(generator.name(), &image.url, &video_url).await;
        Ok(Some(video_url))
    }

    async fn publish(&self, provider: &str, cover_url: &str, video_url: &str) {
        match self.publisher.import(provider, cover_url, video_url).await {
            Ok(receipt) => info!(provider, receipt = %receipt, "imported video to server"),
            Err(e) => error!(provider, error = %e, "error importing video"),
        }
    }
}

#[async_trait]
impl RetryableOperation for GenerationPipeline {
    type Payload = GenerationKind;

    fn name(&self, payload: &GenerationKind) -> String {
        payload.to_string()
    }

    async fn attempt(
        &self,
        state: &RetryState<GenerationKind>,
    ) -> Result<Option<String>, TaskError> {
        match state.payload {
            GenerationKind::TextToVideo => self.text_to_video().await,
            GenerationKind::ImageToVideo => {
                self.image_to_video(state.payload, PromptKind::Image).await
            }
            GenerationKind::PortraitToVideo => {
                self.image_to_video(state.payload, PromptKind::Portrait)
                    .await
            }
        }
    }
}

impl std::fmt::Debug for GenerationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationPipeline")
            .field("generators", &self.generators)
            .field("aspect_ratio", &self.aspect_ratio)
            .finish_non_exhaustive()
    }
}
