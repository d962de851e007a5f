// Instagram parser - delegates to a remote media-extraction API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use url::Url;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::{FetchRequest, Fetcher};
use crate::extractor::models::{MediaApiConfig, VideoMetadata};
use crate::extractor::traits::PlatformParser;
use crate::extractor::utils::non_empty;

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    medias: Option<Vec<Media>>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    resource_url: Option<String>,
}

pub struct InstagramParser {
    fetcher: Arc<dyn Fetcher>,
    api: MediaApiConfig,
}

impl InstagramParser {
    pub fn new(fetcher: Arc<dyn Fetcher>, api: MediaApiConfig) -> Self {
        Self { fetcher, api }
    }

    /// Origin + path; the extraction service chokes on tracking parameters
    fn clean_url(url: &str) -> String {
        match Url::parse(url) {
            Ok(parsed) => format!("{}{}", parsed.origin().ascii_serialization(), parsed.path()),
            Err(_) => url.split('?').next().unwrap_or(url).to_string(),
        }
    }
}

#[async_trait]
impl PlatformParser for InstagramParser {
    fn name(&self) -> &'static str {
        "Instagram"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("instagram.com") || url.contains("instagr.am")
    }

    async fn extract(&self, url: &str) -> Result<VideoMetadata, ExtractError> {
        let clean = Self::clean_url(url);
        tracing::debug!(url = %clean, "resolving via media extraction API");

        let request = FetchRequest::post_json(json!({ "url": clean, "site": "instagram" }))
            .header("Content-Type", "application/json")
            .header("Accept", "*/*")
            .header("g-footer", &self.api.footer)
            .header("g-timestamp", &self.api.timestamp);

        let response = self
            .fetcher
            .fetch(&self.api.endpoint, request)
            .await?
            .error_for_status()?;
        let data: ExtractResponse = response.json()?;

        let medias = data.medias.unwrap_or_default();
        if medias.is_empty() {
            return Err(ExtractError::NoVideoFound(
                "extraction API returned no media for this Instagram link".to_string(),
            ));
        }

        let video_url = medias
            .iter()
            .filter(|m| m.media_type.as_deref() == Some("video"))
            .find_map(|m| non_empty(m.resource_url.as_deref()))
            .ok_or_else(|| {
                ExtractError::NoVideoFound("Instagram post contains no video".to_string())
            })?;

        Ok(VideoMetadata::new(video_url)
            .with_title(Some("Instagram Video".to_string()))
            .with_content(
                non_empty(data.text.as_deref()).or_else(|| Some("Imported from Instagram".to_string())),
            ))
    }
}
