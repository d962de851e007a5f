// Dispatcher with fallback logic
//
// Parsers are tried in registry order. The first one whose `can_handle`
// accepts the URL runs; if it fails and is not the catch-all, the first
// fallback parser after it runs next. Other specific parsers are skipped
// even when their `can_handle` also matches. At most two attempts per request.

use std::sync::Arc;

use super::errors::ExtractError;
use super::fetch::{Fetcher, ProxyFetcher};
use super::models::{ExtractorConfig, VideoMetadata};
use super::platforms::{BilibiliParser, GenericParser, InstagramParser, XiaohongshuParser};
use super::traits::PlatformParser;
use super::utils::{extract_url, storage_key};

pub struct Dispatcher {
    parsers: Vec<Box<dyn PlatformParser>>,
}

impl Dispatcher {
    /// Dispatcher over an explicit, ordered parser list. The catch-all
    /// parser belongs last.
    pub fn new(parsers: Vec<Box<dyn PlatformParser>>) -> Self {
        if !parsers.last().map_or(false, |p| p.is_fallback()) {
            tracing::warn!("parser registry does not end with a fallback parser");
        }
        Self { parsers }
    }

    /// Default registry backed by the reqwest fetcher
    pub fn with_config(config: ExtractorConfig) -> Self {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ProxyFetcher::new(&config));
        Self::with_fetcher(fetcher, config)
    }

    /// Default registry: Xiaohongshu, Instagram, Bilibili, then Generic
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: ExtractorConfig) -> Self {
        Self::new(vec![
            Box::new(XiaohongshuParser::new(fetcher.clone())),
            Box::new(InstagramParser::new(fetcher.clone(), config.media_api)),
            Box::new(BilibiliParser::new(fetcher.clone(), config.resolver_endpoint)),
            Box::new(GenericParser::new(fetcher)),
        ])
    }

    /// Parser names in priority order
    pub fn parser_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Find the first link in pasted text and extract it
    pub async fn parse(&self, text: &str) -> Result<VideoMetadata, ExtractError> {
        let url = extract_url(text)?;
        self.extract(&url).await
    }

    /// Extract a single URL, attaching its storage key on success
    pub async fn extract(&self, url: &str) -> Result<VideoMetadata, ExtractError> {
        let key = storage_key(url);

        let index = self
            .parsers
            .iter()
            .position(|p| p.can_handle(url))
            .ok_or(ExtractError::NoHandler)?;
        let parser = &self.parsers[index];

        let error = match Self::attempt(parser.as_ref(), url).await {
            Ok(metadata) => return Ok(Self::finish(metadata, key)),
            Err(e) if parser.is_fallback() => {
                tracing::error!(parser = parser.name(), url = %url, error = %e, "extraction failed");
                return Err(e);
            }
            Err(e) => e,
        };

        let Some(fallback) = self.parsers[index + 1..]
            .iter()
            .find(|p| p.is_fallback() && p.can_handle(url))
        else {
            tracing::error!(parser = parser.name(), url = %url, error = %error, "extraction failed, no fallback parser");
            return Err(ExtractError::NoHandler);
        };
        tracing::warn!(
            parser = parser.name(),
            fallback = fallback.name(),
            url = %url,
            error = %error,
            "parser failed, falling back"
        );

        match Self::attempt(fallback.as_ref(), url).await {
            Ok(metadata) => Ok(Self::finish(metadata, key)),
            Err(e) => {
                tracing::error!(parser = fallback.name(), url = %url, error = %e, "extraction failed");
                Err(e)
            }
        }
    }

    async fn attempt(parser: &dyn PlatformParser, url: &str) -> Result<VideoMetadata, ExtractError> {
        tracing::debug!(parser = parser.name(), url = %url, "trying parser");
        let metadata = parser.extract(url).await?;
        tracing::info!(parser = parser.name(), url = %url, "extracted video");
        Ok(metadata)
    }

    fn finish(metadata: VideoMetadata, key: String) -> VideoMetadata {
        let mut metadata = metadata.secured();
        metadata.storage_key = Some(key);
        metadata
    }
}
