// Generic parser - best-effort scraping of standard meta tags

use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::{FetchRequest, Fetcher};
use crate::extractor::models::VideoMetadata;
use crate::extractor::traits::PlatformParser;
use crate::extractor::utils::{non_empty, OG_DESCRIPTION, OG_TITLE, OG_VIDEO};

lazy_static::lazy_static! {
    static ref TITLE_TAG_RE: Regex = Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap();
    /// The extension must end the path, so hosts like `a.mov.com` do not count
    static ref VIDEO_FILE_RE: Regex = Regex::new(
        r##"(?i)(https?://[^"'\s<>?#]+?\.(?:mp4|m3u8|webm|mov)(?:[?#][^"'\s<>]*)?)(?:["'\s<>),;\\]|$)"##
    )
    .unwrap();
}

pub struct GenericParser {
    fetcher: Arc<dyn Fetcher>,
}

impl GenericParser {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    fn title(html: &str) -> Option<String> {
        OG_TITLE.find(html).or_else(|| {
            TITLE_TAG_RE
                .captures(html)
                .and_then(|caps| non_empty(caps.get(1).map(|m| m.as_str())))
        })
    }

    fn video_url(html: &str) -> Option<String> {
        OG_VIDEO
            .find(html)
            .map(|url| url.replace("&amp;", "&"))
            .or_else(|| {
                VIDEO_FILE_RE
                    .captures(html)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            })
    }
}

#[async_trait]
impl PlatformParser for GenericParser {
    fn name(&self) -> &'static str {
        "Generic"
    }

    fn can_handle(&self, _url: &str) -> bool {
        true
    }

    async fn extract(&self, url: &str) -> Result<VideoMetadata, ExtractError> {
        let response = self
            .fetcher
            .fetch(url, FetchRequest::get())
            .await?
            .error_for_status()?;
        let html = response.text();

        let video_url = Self::video_url(html).ok_or_else(|| {
            ExtractError::NoVideoFound(
                "could not find a video stream; check that the link is valid".to_string(),
            )
        })?;

        Ok(VideoMetadata::new(video_url)
            .with_title(Self::title(html))
            .with_content(OG_DESCRIPTION.find(html)))
    }

    fn is_fallback(&self) -> bool {
        true
    }
}
