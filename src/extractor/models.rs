// Common data models for link extraction

use serde::{Deserialize, Serialize};

use super::utils::ensure_https;

/// Video metadata extracted from a share link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Direct, playable video resource (always https)
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description or caption text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Normalized key of the share link, set by the dispatcher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}

impl VideoMetadata {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: ensure_https(&url.into()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    pub fn with_duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration;
        self
    }

    /// Re-apply the secure scheme rule; parsers may have built the value by hand
    pub fn secured(mut self) -> Self {
        self.url = ensure_https(&self.url);
        self
    }
}

/// Remote media-extraction API settings
#[derive(Debug, Clone)]
pub struct MediaApiConfig {
    pub endpoint: String,
    /// Value of the `g-footer` header
    pub footer: String,
    /// Value of the `g-timestamp` header
    pub timestamp: String,
}

impl Default for MediaApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://service.iiilab.com/iiilab/extract".to_string(),
            footer: "68d153a07fac84c3498031aaea996ae9".to_string(),
            timestamp: "1764759546".to_string(),
        }
    }
}

/// Configuration for extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Prefix prepended to every outbound URL (`proxy_base + urlencode(target)`)
    pub proxy_base: Option<String>,
    /// SOCKS5/HTTP proxy URL for the HTTP client
    pub http_proxy: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    pub user_agent: String,
    pub media_api: MediaApiConfig,
    /// Bilibili resolver endpoint (queried with `?url=...&type=json`)
    pub resolver_endpoint: String,
}

pub const DEFAULT_PROXY_BASE: &str = "https://cros.alphaxiv.cn/";

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            proxy_base: Some(DEFAULT_PROXY_BASE.to_string()),
            http_proxy: None,
            timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36".to_string(),
            media_api: MediaApiConfig::default(),
            resolver_endpoint: "https://api.mir6.com/api/bzjiexi".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Defaults overlaid with `VIDEO_PARSER_*` environment variables.
    ///
    /// An empty `VIDEO_PARSER_PROXY_BASE` disables the proxy prefix.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("VIDEO_PARSER_PROXY_BASE") {
            config.proxy_base = if base.trim().is_empty() {
                None
            } else {
                Some(base)
            };
        }

        if let Ok(proxy) = std::env::var("VIDEO_PARSER_HTTP_PROXY") {
            if !proxy.trim().is_empty() {
                config.http_proxy = Some(proxy);
            }
        }

        if let Ok(timeout) = std::env::var("VIDEO_PARSER_TIMEOUT") {
            match timeout.trim().parse::<u32>() {
                Ok(secs) if secs > 0 => config.timeout_seconds = secs,
                _ => tracing::warn!(value = %timeout, "ignoring invalid VIDEO_PARSER_TIMEOUT"),
            }
        }

        config
    }

    pub fn with_proxy_base(mut self, base: Option<String>) -> Self {
        self.proxy_base = base;
        self
    }

    pub fn with_http_proxy(mut self, proxy: Option<String>) -> Self {
        self.http_proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_media_api(mut self, media_api: MediaApiConfig) -> Self {
        self.media_api = media_api;
        self
    }

    pub fn with_resolver_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.resolver_endpoint = endpoint.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_upgrades_scheme() {
        let meta = VideoMetadata::new("http://x.com/v.mp4");
        assert_eq!(meta.url, "https://x.com/v.mp4");
    }

    #[test]
    fn test_serializes_camel_case_without_empty_fields() {
        let mut meta = VideoMetadata::new("https://x.com/v.mp4").with_duration(Some(12.5));
        meta.storage_key = Some("x.com/page".to_string());

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["storageKey"], "x.com/page");
        assert_eq!(json["duration"], 12.5);
        assert!(json.get("title").is_none());
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = ExtractorConfig::default()
            .with_proxy_base(None)
            .with_timeout(5)
            .with_resolver_endpoint("http://127.0.0.1/resolve");

        assert!(config.proxy_base.is_none());
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.resolver_endpoint, "http://127.0.0.1/resolve");
        assert_eq!(config.media_api.footer, MediaApiConfig::default().footer);
    }
}
