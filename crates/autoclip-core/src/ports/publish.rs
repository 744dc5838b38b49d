//! Cover extraction and publishing ports.

use async_trait::async_trait;

use super::CollaboratorError;

/// Turns a generated video into a hosted cover image URL.
#[async_trait]
pub trait CoverExtractor: Send + Sync {
    async fn cover_for(&self, video_url: &str) -> Result<String, CollaboratorError>;
}

/// The publishing backend that imports finished clips.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Import a clip credited to `provider`. Returns the backend's receipt.
    async fn import(
        &self,
        provider: &str,
        cover_url: &str,
        video_url: &str,
    ) -> Result<String, CollaboratorError>;
}
