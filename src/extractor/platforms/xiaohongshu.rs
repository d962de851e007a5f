// Xiaohongshu parser - reads the page's embedded application state
//
// Each field (url, title, content) is resolved independently:
// 1. window.__INITIAL_STATE__ blob, repaired and parsed as JSON
// 2. Regex over the raw HTML (meta tags, then bare "masterUrl" scan)

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

use crate::extractor::errors::ExtractError;
use crate::extractor::fetch::{FetchRequest, Fetcher};
use crate::extractor::models::VideoMetadata;
use crate::extractor::traits::PlatformParser;
use crate::extractor::utils::{non_empty, OG_DESCRIPTION, OG_TITLE, OG_VIDEO};

const VIDEO_CDN_BASE: &str = "https://sns-video-bd.xhscdn.com/";

lazy_static::lazy_static! {
    /// Blob ends at the earliest `};` or `}</script>`
    static ref STATE_RE: Regex =
        Regex::new(r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.+?\})\s*(?:;|</script>)").unwrap();
    static ref UNDEFINED_RE: Regex = Regex::new(r":\s*undefined\b").unwrap();
    static ref MASTER_URL_RE: Regex = Regex::new(r#""masterUrl":"([^"]+)""#).unwrap();
}

/// Fields recovered from the state blob
#[derive(Debug, Default)]
struct NoteState {
    url: Option<String>,
    title: Option<String>,
    content: Option<String>,
}

pub struct XiaohongshuParser {
    fetcher: Arc<dyn Fetcher>,
}

impl XiaohongshuParser {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Locate, repair and parse the state blob
    fn parse_state(html: &str) -> Result<NoteState, ExtractError> {
        let raw = STATE_RE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| ExtractError::Parse("no __INITIAL_STATE__ in page".to_string()))?
            .as_str();

        let repaired = UNDEFINED_RE.replace_all(raw, ":null");
        let state: Value = serde_json::from_str(&repaired)?;

        Ok(Self::read_note(&state))
    }

    fn read_note(state: &Value) -> NoteState {
        let note = &state["note"];
        let detail = note["firstNoteId"]
            .as_str()
            .map(|id| &note["noteDetailMap"][id]["note"])
            .filter(|d| d.is_object())
            .or_else(|| Some(&note["note"]).filter(|d| d.is_object()));

        let Some(detail) = detail else {
            return NoteState::default();
        };

        NoteState {
            url: Self::video_url(&detail["video"]),
            title: non_empty(detail["title"].as_str()),
            content: non_empty(detail["desc"].as_str()),
        }
    }

    /// Known video fields, most reliable first
    fn video_url(video: &Value) -> Option<String> {
        non_empty(video["masterUrl"].as_str())
            .or_else(|| non_empty(video["media"]["stream"]["h264"][0]["masterUrl"].as_str()))
            .or_else(|| non_empty(video["media"]["stream"]["h265"][0]["masterUrl"].as_str()))
            .or_else(|| {
                non_empty(video["consumer"]["originVideoKey"].as_str())
                    .map(|key| format!("{}{}", VIDEO_CDN_BASE, key))
            })
    }

    /// Raw-HTML fallback for the video URL
    fn scan_video_url(html: &str) -> Option<String> {
        OG_VIDEO.find(html).or_else(|| {
            MASTER_URL_RE.captures(html).and_then(|caps| {
                let raw = caps.get(1)?.as_str();
                non_empty(Some(&raw.replace("\\u002F", "/").replace('\\', "")))
            })
        })
    }
}

#[async_trait]
impl PlatformParser for XiaohongshuParser {
    fn name(&self) -> &'static str {
        "Xiaohongshu"
    }

    fn can_handle(&self, url: &str) -> bool {
        url.contains("xiaohongshu.com") || url.contains("xhslink.com")
    }

    async fn extract(&self, url: &str) -> Result<VideoMetadata, ExtractError> {
        let response = self
            .fetcher
            .fetch(url, FetchRequest::get())
            .await?
            .error_for_status()?;
        let html = response.text();

        let state = match Self::parse_state(html) {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(error = %e, "state blob unusable, falling back to regex");
                NoteState::default()
            }
        };

        let video_url = state
            .url
            .or_else(|| Self::scan_video_url(html))
            .ok_or_else(|| {
                ExtractError::NoVideoFound("could not find video URL in Xiaohongshu page".to_string())
            })?;

        Ok(VideoMetadata::new(video_url)
            .with_title(state.title.or_else(|| OG_TITLE.find(html)))
            .with_content(state.content.or_else(|| OG_DESCRIPTION.find(html))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::fetch::testing::ScriptedFetcher;

    fn parser_for(html: &str) -> XiaohongshuParser {
        XiaohongshuParser::new(Arc::new(
            ScriptedFetcher::new().respond("xiaohongshu.com", 200, html),
        ))
    }

    const PAGE_URL: &str = "https://www.xiaohongshu.com/explore/65f1";

    #[test]
    fn test_can_handle() {
        let parser = XiaohongshuParser::new(Arc::new(ScriptedFetcher::new()));
        assert!(parser.can_handle("http://xhslink.com/a/AbCd"));
        assert!(parser.can_handle(PAGE_URL));
        assert!(!parser.can_handle("https://www.bilibili.com/video/BV1"));
    }

    #[tokio::test]
    async fn test_state_blob_with_undefined() {
        let html = r#"<html><script>window.__INITIAL_STATE__={"note":{"firstNoteId":"n1","noteDetailMap":{"n1":{"note":{"title":"Dumplings","desc":"How to fold","video":{"masterUrl":"http://sns-video.xhscdn.com/n1.mp4","extra":undefined}}}}}}</script></html>"#;

        let meta = parser_for(html).extract(PAGE_URL).await.unwrap();
        assert_eq!(meta.url, "https://sns-video.xhscdn.com/n1.mp4");
        assert_eq!(meta.title.as_deref(), Some("Dumplings"));
        assert_eq!(meta.content.as_deref(), Some("How to fold"));
    }

    #[tokio::test]
    async fn test_nested_stream_and_origin_key() {
        let html = r#"<script>window.__INITIAL_STATE__ = {"note":{"note":{"video":{"media":{"stream":{"h264":[{"masterUrl":"https://cdn/h264.mp4"}]}}}}}};</script>"#;
        let meta = parser_for(html).extract(PAGE_URL).await.unwrap();
        assert_eq!(meta.url, "https://cdn/h264.mp4");

        let html = r#"<script>window.__INITIAL_STATE__={"note":{"note":{"video":{"consumer":{"originVideoKey":"pre/abc"}}}}}</script>"#;
        let meta = parser_for(html).extract(PAGE_URL).await.unwrap();
        assert_eq!(meta.url, "https://sns-video-bd.xhscdn.com/pre/abc");
    }

    #[tokio::test]
    async fn test_state_followed_by_other_scripts() {
        let html = r#"<script>window.__INITIAL_STATE__={"note":{"note":{"title":"T","desc":"D","video":{"masterUrl":"https://cdn/a.mp4"}}}};</script>
<script>window.cfg={"x":1}</script>"#;

        let meta = parser_for(html).extract(PAGE_URL).await.unwrap();
        assert_eq!(meta.url, "https://cdn/a.mp4");
        assert_eq!(meta.title.as_deref(), Some("T"));
        assert_eq!(meta.content.as_deref(), Some("D"));
    }

    #[tokio::test]
    async fn test_broken_state_falls_back_to_regex() {
        let html = r#"<head><meta property="og:title" content="Meta title"><meta name="description" content="Meta desc"></head>
<script>window.__INITIAL_STATE__={"note": {broken</script>
<script>var x = {"masterUrl":"http://sns-video.xhscdn.com/raw.mp4"};</script>"#;

        let meta = parser_for(html).extract(PAGE_URL).await.unwrap();
        assert_eq!(meta.url, "https://sns-video.xhscdn.com/raw.mp4");
        assert_eq!(meta.title.as_deref(), Some("Meta title"));
        assert_eq!(meta.content.as_deref(), Some("Meta desc"));
    }

    #[tokio::test]
    async fn test_state_title_with_meta_video() {
        let html = r#"<meta name="og:video" content="https://cdn/og.mp4">
<script>window.__INITIAL_STATE__={"note":{"note":{"title":"From state","video":{}}}}</script>"#;

        let meta = parser_for(html).extract(PAGE_URL).await.unwrap();
        assert_eq!(meta.url, "https://cdn/og.mp4");
        assert_eq!(meta.title.as_deref(), Some("From state"));
        assert_eq!(meta.content, None);
    }

    #[tokio::test]
    async fn test_no_video_anywhere() {
        let err = parser_for("<html><title>Nothing</title></html>")
            .extract(PAGE_URL)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::NoVideoFound(_)));
    }

    #[tokio::test]
    async fn test_http_error_is_transport() {
        let parser = XiaohongshuParser::new(Arc::new(
            ScriptedFetcher::new().respond("xiaohongshu.com", 503, ""),
        ));
        let err = parser.extract(PAGE_URL).await.unwrap_err();
        assert!(err.is_transport());
    }
}
