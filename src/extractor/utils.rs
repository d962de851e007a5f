// Helper functions shared by the dispatcher and platform parsers

use regex::Regex;
use url::Url;

use super::errors::ExtractError;

lazy_static::lazy_static! {
    static ref URL_RE: Regex =
        Regex::new(r"https?://[a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+").unwrap();
    static ref SCHEME_RE: Regex = Regex::new(r"(?i)^https?://").unwrap();
    static ref WWW_RE: Regex = Regex::new(r"(?i)^(?:www\.)+").unwrap();

    pub(crate) static ref OG_TITLE: MetaPattern = MetaPattern::new("og:title");
    pub(crate) static ref OG_DESCRIPTION: MetaPattern =
        MetaPattern::new("og:description|description");
    pub(crate) static ref OG_VIDEO: MetaPattern =
        MetaPattern::new("og:video|og:video:url|og:video:secure_url");
}

/// Characters messaging apps glue onto the end of a pasted link
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', ')'];

/// Pull the first http(s) link out of arbitrary pasted text.
///
/// Trailing `. , ; : ! )` are dropped. Matches that are nothing but a scheme
/// once cleaned are skipped.
pub fn extract_url(text: &str) -> Result<String, ExtractError> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .find(|candidate| {
            candidate
                .split_once("://")
                .map_or(false, |(_, rest)| !rest.is_empty())
        })
        .map(str::to_string)
        .ok_or(ExtractError::NoUrlFound)
}

/// Canonical `host/path` key for a share link.
///
/// Scheme, `www.`, query, fragment and trailing slashes are removed. Never
/// fails: unparsable input degrades to a pattern-based strip.
pub fn storage_key(url: &str) -> String {
    let trimmed = url.trim();
    let without_scheme = SCHEME_RE.replace(trimmed, "");
    let stripped = WWW_RE.replace(&without_scheme, "").into_owned();

    match key_from_parsed(&stripped) {
        Some(key) => key,
        None => {
            tracing::debug!(url = %trimmed, "storage key falling back to pattern strip");
            let end = stripped.find(&['?', '#'][..]).unwrap_or(stripped.len());
            stripped[..end].to_string()
        }
    }
}

fn key_from_parsed(stripped: &str) -> Option<String> {
    let parsed = Url::parse(&format!("http://{}", stripped)).ok()?;
    let host = parsed.host_str()?;
    let host = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let path = parsed.path().trim_end_matches('/');
    Some(format!("{}{}", host, path))
}

/// Rewrite insecure or scheme-relative URLs to https
pub fn ensure_https(url: &str) -> String {
    let url = url.trim();
    if url.get(..5).map_or(false, |s| s.eq_ignore_ascii_case("http:")) {
        format!("https:{}", &url[5..])
    } else if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

/// Non-empty trimmed string from an optional JSON field
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `<meta>` lookup that accepts both `name|property ... content` and
/// `content ... name|property` attribute orders.
pub(crate) struct MetaPattern {
    name_first: Regex,
    content_first: Regex,
}

impl MetaPattern {
    /// `names` is a regex alternation such as `og:description|description`
    pub(crate) fn new(names: &str) -> Self {
        let name_first = format!(
            r#"(?i)<meta[^>]+(?:name|property)=["'](?:{})["'][^>]+content=["']([^"']+)["']"#,
            names
        );
        let content_first = format!(
            r#"(?i)<meta[^>]+content=["']([^"']+)["'][^>]+(?:name|property)=["'](?:{})["']"#,
            names
        );
        Self {
            name_first: Regex::new(&name_first).unwrap(),
            content_first: Regex::new(&content_first).unwrap(),
        }
    }

    pub(crate) fn find(&self, html: &str) -> Option<String> {
        [&self.name_first, &self.content_first]
            .into_iter()
            .find_map(|re| re.captures(html))
            .and_then(|caps| non_empty(caps.get(1).map(|m| m.as_str())))
    }
}
