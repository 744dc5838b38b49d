//! In-process stand-ins for the external collaborators.
//!
//! The daemon runs against these when no real provider is wired in; they
//! poll, fail and produce URLs the way the remote services do, without the
//! network.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rand::Rng;
use tracing::info;
use ulid::Ulid;

use super::polling::{PollSchedule, PollStatus, poll_job};
use crate::domain::AspectRatio;
use crate::ports::{
    Capability, CollaboratorError, CoverExtractor, GeneratedImage, GenerationRequest,
    ImageGenerator, PromptKind, PromptSource, Publisher, VideoGenerator,
};

/// Numbered prompts per kind.
#[derive(Debug, Default)]
pub struct CannedPrompts {
    issued: AtomicU64,
}

#[async_trait]
impl PromptSource for CannedPrompts {
    async fn prompt(&self, kind: PromptKind) -> Result<String, CollaboratorError> {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(format!("{kind} prompt #{n}"))
    }

    async fn describe_scene(
        &self,
        image_url: &str,
        seed_prompt: &str,
    ) -> Result<String, CollaboratorError> {
        Ok(format!("slow push-in on {image_url}: {seed_prompt}"))
    }
}

/// A video provider that polls a fake remote job.
///
/// With probability `failure_rate` the finished job is either failed by the
/// provider or completes without a video URL, so both retry paths get used.
#[derive(Debug, Clone)]
pub struct SimulatedVideoGenerator {
    name: String,
    capability: Capability,
    schedule: PollSchedule,
    polls_to_finish: u32,
    failure_rate: f64,
}

impl SimulatedVideoGenerator {
    pub fn new(name: impl Into<String>, capability: Capability, schedule: PollSchedule) -> Self {
        Self {
            name: name.into(),
            capability,
            schedule,
            polls_to_finish: 3,
            failure_rate: 0.0,
        }
    }

    pub fn with_polls_to_finish(mut self, polls: u32) -> Self {
        self.polls_to_finish = polls.max(1);
        self
    }

    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Roll the final state of a finished job.
    fn finish(&self, job_id: Ulid) -> PollStatus<Option<String>> {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(self.failure_rate) {
            if rng.gen_bool(0.5) {
                PollStatus::Failed("generation failed".to_string())
            } else {
                PollStatus::Ready(None)
            }
        } else {
            let host = self.name.to_lowercase().replace(' ', "-");
            PollStatus::Ready(Some(format!("https://{host}.sim/videos/{job_id}.mp4")))
        }
    }
}

#[async_trait]
impl VideoGenerator for SimulatedVideoGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<String>, CollaboratorError> {
        if self.capability == Capability::ImageOnly && request.image_url.is_none() {
            return Err(CollaboratorError::request(
                &self.name,
                "image_url is required",
            ));
        }

        let job_id = Ulid::new();
        info!(
            provider = %self.name,
            job_id = %job_id,
            aspect_ratio = %request.aspect_ratio,
            "submitted generation job"
        );

        let mut polls = 0;
        poll_job(&self.name, &self.schedule, || {
            polls += 1;
            let status = if polls < self.polls_to_finish {
                PollStatus::Pending("processing".to_string())
            } else {
                self.finish(job_id)
            };
            async move { Ok(status) }
        })
        .await
    }
}

/// Still images at a fixed aspect ratio.
#[derive(Debug, Clone, Default)]
pub struct SimulatedImageGenerator {
    aspect_ratio: AspectRatio,
}

impl SimulatedImageGenerator {
    pub fn new(aspect_ratio: AspectRatio) -> Self {
        Self { aspect_ratio }
    }
}

#[async_trait]
impl ImageGenerator for SimulatedImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, CollaboratorError> {
        if prompt.trim().is_empty() {
            return Err(CollaboratorError::request("images", "empty prompt"));
        }
        Ok(GeneratedImage {
            url: format!("https://images.sim/{}.png", Ulid::new()),
            aspect_ratio: self.aspect_ratio,
        })
    }
}

/// Uses the frame at one second as the cover, served next to the video.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSecondCover;

#[async_trait]
impl CoverExtractor for FirstSecondCover {
    async fn cover_for(&self, video_url: &str) -> Result<String, CollaboratorError> {
        let stem = video_url.strip_suffix(".mp4").unwrap_or(video_url);
        Ok(format!("{stem}-1s.jpg"))
    }
}

/// Logs imports instead of calling the backend.
#[derive(Debug, Default)]
pub struct LoggingPublisher {
    imported: AtomicU64,
}

impl LoggingPublisher {
    pub fn imported(&self) -> u64 {
        self.imported.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Publisher for LoggingPublisher {
    async fn import(
        &self,
        provider: &str,
        cover_url: &str,
        video_url: &str,
    ) -> Result<String, CollaboratorError> {
        let n = self.imported.fetch_add(1, Ordering::Relaxed) + 1;
        info!(provider, cover_url, video_url, "imported video");
        Ok(format!("import-{n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast() -> PollSchedule {
        PollSchedule::new(Duration::from_secs(1), Duration::from_secs(10))
    }

    fn request(image_url: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            prompt: "a fox in the snow".to_string(),
            image_url: image_url.map(str::to_string),
            aspect_ratio: AspectRatio::Vertical,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reliable_generator_returns_a_url() {
        let generator = SimulatedVideoGenerator::new("Luma AI", Capability::Universal, fast());
        let url = generator.generate(&request(None)).await.unwrap().unwrap();
        assert!(url.starts_with("https://luma-ai.sim/videos/"));
        assert!(url.ends_with(".mp4"));
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_generator_never_returns_a_url() {
        let generator = SimulatedVideoGenerator::new("Runway AI", Capability::Universal, fast())
            .with_failure_rate(1.0);
        for _ in 0..5 {
            let result = generator.generate(&request(None)).await;
            assert!(matches!(result, Ok(None) | Err(CollaboratorError::JobFailed { .. })));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generator_times_out() {
        let generator = SimulatedVideoGenerator::new("Veo 3 AI", Capability::Universal, fast())
            .with_polls_to_finish(100);
        let err = generator.generate(&request(None)).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Timeout { .. }));
    }

    #[tokio::test]
    async fn image_only_generator_requires_an_image() {
        let generator = SimulatedVideoGenerator::new("Midjourney AI", Capability::ImageOnly, fast());
        let err = generator.generate(&request(None)).await.unwrap_err();
        assert_eq!(err.provider(), "Midjourney AI");
    }

    #[tokio::test]
    async fn cover_sits_next_to_the_video() {
        let cover = FirstSecondCover
            .cover_for("https://cdn.sim/videos/abc.mp4")
            .await
            .unwrap();
        assert_eq!(cover, "https://cdn.sim/videos/abc-1s.jpg");
    }
}
