// Platform parser trait definition

use async_trait::async_trait;

use super::errors::ExtractError;
use super::models::VideoMetadata;

/// Trait for platform parser implementations
#[async_trait]
pub trait PlatformParser: Send + Sync {
    /// Name of the parser (for logging)
    fn name(&self) -> &'static str;

    /// Whether this parser recognizes the URL. Pure, never fails.
    fn can_handle(&self, url: &str) -> bool;

    /// Extract video metadata from URL
    async fn extract(&self, url: &str) -> Result<VideoMetadata, ExtractError>;

    /// The catch-all parser; its failures are terminal
    fn is_fallback(&self) -> bool {
        false
    }
}
