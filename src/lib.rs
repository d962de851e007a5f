pub mod extractor;

pub use extractor::{
    extract_url, storage_key, Dispatcher, ExtractError, ExtractorConfig, Fetcher, PlatformParser,
    VideoMetadata,
};

lazy_static::lazy_static! {
    /// Process-wide registry, built once from the environment
    static ref DEFAULT_DISPATCHER: Dispatcher = Dispatcher::with_config(ExtractorConfig::from_env());
}

/// Extract a playable video URL and metadata from pasted share text
pub async fn parse_video_url(input_text: &str) -> Result<VideoMetadata, ExtractError> {
    DEFAULT_DISPATCHER.parse(input_text).await
}
