// Bilibili parser - uses an external resolver API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::{FetchRequest, Fetcher};
use crate::extractor::models::VideoMetadata;
use crate::extractor::traits::PlatformParser;
use crate::extractor::utils::non_empty;

/// Resolver's own status code for a successful lookup
const RESOLVER_OK: i64 = 200;

#[derive(Debug, Deserialize)]
struct ResolverResponse {
    /// Numeric status in the body, independent of the HTTP status
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    /// Array of entries on success; failures may send a string or object
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResolverEntry {
    #[serde(default)]
    video_url: Option<String>,
    /// Kept raw: only JSON numbers count as a duration
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    desc: Option<String>,
}

pub struct BilibiliParser {
    fetcher: Arc<dyn Fetcher>,
    endpoint: String,
}

impl BilibiliParser {
    pub fn new(fetcher: Arc<dyn Fetcher>, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.into(),
        }
    }

    fn resolver_url(&self, url: &str) -> String {
        format!(
            "{}?url={}&type=json",
            self.endpoint,
            urlencoding::encode(url)
        )
    }
}

#[async_trait]
impl PlatformParser for BilibiliParser {
    fn name(&self) -> &'static str {
        "Bilibili"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("bilibili.com") || url.contains("b23.tv")
    }

    async fn extract(&self, url: &str) -> Result<VideoMetadata, ExtractError> {
        let response = self
            .fetcher
            .fetch(&self.resolver_url(url), FetchRequest::get())
            .await?
            .error_for_status()?;
        let json: ResolverResponse = response.json()?;

        let succeeded = json.code.as_ref().and_then(Value::as_i64) == Some(RESOLVER_OK);
        let entry = match json.data {
            Some(Value::Array(entries)) if succeeded => entries.into_iter().next(),
            _ => None,
        };
        let Some(entry) = entry else {
            let message = non_empty(json.msg.as_deref())
                .unwrap_or_else(|| "Bilibili API parsing failed".to_string());
            return Err(ExtractError::api("Bilibili resolver", message));
        };
        let entry: ResolverEntry = serde_json::from_value(entry)?;

        let video_url = non_empty(entry.video_url.as_deref()).ok_or_else(|| {
            ExtractError::NoVideoFound("resolver reported success but returned no video URL".to_string())
        })?;

        Ok(VideoMetadata::new(video_url)
            .with_duration(entry.duration.as_ref().and_then(Value::as_f64))
            .with_title(non_empty(json.title.as_deref()).or_else(|| non_empty(entry.title.as_deref())))
            .with_content(non_empty(json.desc.as_deref()).or_else(|| non_empty(entry.desc.as_deref()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::ExtractorConfig;
    use crate::extractor::fetch::testing::ScriptedFetcher;

    const VIDEO: &str = "https://www.bilibili.com/video/BV1xx411c7mD?p=1";

    fn parser_for(body: &str) -> BilibiliParser {
        BilibiliParser::new(
            Arc::new(ScriptedFetcher::new().respond("bzjiexi", 200, body)),
            ExtractorConfig::default().resolver_endpoint,
        )
    }

    #[test]
    fn test_resolver_url() {
        let parser = parser_for("{}");
        assert_eq!(
            parser.resolver_url("https://b23.tv/AbC"),
            "https://api.mir6.com/api/bzjiexi?url=https%3A%2F%2Fb23.tv%2FAbC&type=json"
        );
    }

    #[tokio::test]
    async fn test_success_upgrades_scheme_and_keeps_duration() {
        let parser = parser_for(r#"{"code":200,"data":[{"video_url":"http://x.com/v.mp4","duration":12.5}]}"#);

        let meta = parser.extract(VIDEO).await.unwrap();
        assert_eq!(meta.url, "https://x.com/v.mp4");
        assert_eq!(meta.duration, Some(12.5));
        assert_eq!(meta.title, None);
    }

    #[tokio::test]
    async fn test_top_level_title_wins() {
        let parser = parser_for(
            r#"{"code":200,"title":"Top","data":[{"video_url":"https://x.com/v.mp4","title":"Entry","desc":"Entry desc"}]}"#,
        );

        let meta = parser.extract(VIDEO).await.unwrap();
        assert_eq!(meta.title.as_deref(), Some("Top"));
        assert_eq!(meta.content.as_deref(), Some("Entry desc"));
    }

    #[tokio::test]
    async fn test_formatted_duration_is_ignored() {
        let parser = parser_for(r#"{"code":200,"data":[{"video_url":"https://x.com/v.mp4","duration":"03:21"}]}"#);
        let meta = parser.extract(VIDEO).await.unwrap();
        assert_eq!(meta.duration, None);
    }

    #[tokio::test]
    async fn test_failure_code_reports_service_message() {
        let parser = parser_for(r#"{"code":201,"msg":"invalid link","data":[]}"#);
        let err = parser.extract(VIDEO).await.unwrap_err();
        assert!(matches!(err, ExtractError::Api { .. }));
        assert!(err.to_string().contains("invalid link"));

        let parser = parser_for(r#"{"code":200,"data":[]}"#);
        let err = parser.extract(VIDEO).await.unwrap_err();
        assert!(err.to_string().contains("Bilibili API parsing failed"));
    }

    #[tokio::test]
    async fn test_failure_with_non_array_data() {
        let parser = parser_for(r#"{"code":400,"msg":"invalid link","data":""}"#);
        let err = parser.extract(VIDEO).await.unwrap_err();
        assert!(matches!(err, ExtractError::Api { .. }));
        assert!(err.to_string().contains("invalid link"));

        let parser = parser_for(r#"{"code":200,"data":{}}"#);
        let err = parser.extract(VIDEO).await.unwrap_err();
        assert!(matches!(err, ExtractError::Api { .. }));
        assert!(err.to_string().contains("Bilibili API parsing failed"));
    }

    #[tokio::test]
    async fn test_success_without_url() {
        let parser = parser_for(r#"{"code":200,"data":[{"duration":10}]}"#);
        let err = parser.extract(VIDEO).await.unwrap_err();
        assert!(matches!(err, ExtractError::NoVideoFound(_)));
    }
}
