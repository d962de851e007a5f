// Error types for link extraction

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// Pasted text does not contain an http(s) link
    #[error("No URL found in the provided text")]
    NoUrlFound,

    /// Fetch itself failed (DNS, TLS, timeout, connection reset)
    #[error("Network error while fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// Fetch completed but the server answered with a non-success status
    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Structured state or JSON payload could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Third-party service answered but refused to resolve the link
    #[error("{service} could not resolve this link: {message}")]
    Api { service: String, message: String },

    /// Every attempt completed without locating a playable stream
    #[error("No video stream found: {0}")]
    NoVideoFound(String),

    /// No registered parser accepted the URL
    #[error("No parser could handle this URL")]
    NoHandler,
}

impl ExtractError {
    pub fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn api(service: &str, message: impl Into<String>) -> Self {
        Self::Api {
            service: service.to_string(),
            message: message.into(),
        }
    }

    /// Transport-level failures (connection or HTTP status)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(format!("Invalid JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ExtractError::transport("https://a.com", "reset").is_transport());
        assert!(ExtractError::HttpStatus {
            url: "https://a.com".to_string(),
            status: 503
        }
        .is_transport());
        assert!(!ExtractError::NoVideoFound("x".to_string()).is_transport());
        assert!(!ExtractError::api("resolver", "bad").is_transport());
    }

    #[test]
    fn test_json_error_becomes_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert!(matches!(ExtractError::from(err), ExtractError::Parse(_)));
    }

    #[test]
    fn test_messages_are_readable() {
        assert_eq!(
            ExtractError::NoUrlFound.to_string(),
            "No URL found in the provided text"
        );
        assert_eq!(
            ExtractError::api("Bilibili resolver", "invalid link").to_string(),
            "Bilibili resolver could not resolve this link: invalid link"
        );
    }
}
