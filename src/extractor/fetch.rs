// Fetch capability used by platform parsers
//
// Parsers never talk to reqwest directly. They go through `Fetcher`, which
// ProxyFetcher implements by prefixing every outbound URL with the
// configured HTTP-to-HTTPS proxy endpoint.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::errors::ExtractError;
use super::models::ExtractorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMethod {
    #[default]
    Get,
    Post,
}

/// Options for a single outbound request
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    pub method: FetchMethod,
    pub headers: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
}

impl FetchRequest {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self {
            method: FetchMethod::Post,
            headers: Vec::new(),
            json: Some(body),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Buffered response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Target URL as requested by the parser (before proxying)
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ExtractError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-2xx answer into a transport error
    pub fn error_for_status(self) -> Result<Self, ExtractError> {
        if self.ok() {
            Ok(self)
        } else {
            Err(ExtractError::HttpStatus {
                url: self.url,
                status: self.status,
            })
        }
    }
}

/// Trait for the network fetch capability
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, request: FetchRequest) -> Result<FetchResponse, ExtractError>;
}

/// `proxy_base + urlencode(target)`, or the target itself without a proxy
pub fn proxied_url(proxy_base: Option<&str>, target: &str) -> String {
    match proxy_base {
        Some(base) if !base.is_empty() => format!("{}{}", base, urlencoding::encode(target)),
        _ => target.to_string(),
    }
}

/// reqwest-backed fetcher routed through the proxy endpoint
pub struct ProxyFetcher {
    client: reqwest::Client,
    proxy_base: Option<String>,
}

impl ProxyFetcher {
    pub fn new(config: &ExtractorConfig) -> Self {
        let client = Self::build_client(config, config.http_proxy.as_deref())
            .or_else(|e| {
                tracing::warn!(error = %e, "invalid HTTP proxy, connecting directly");
                Self::build_client(config, None)
            })
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build configured HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            client,
            proxy_base: config.proxy_base.clone(),
        }
    }

    fn build_client(
        config: &ExtractorConfig,
        proxy: Option<&str>,
    ) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds as u64))
            .user_agent(config.user_agent.as_str());

        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        builder.build()
    }
}

#[async_trait]
impl Fetcher for ProxyFetcher {
    async fn fetch(&self, url: &str, request: FetchRequest) -> Result<FetchResponse, ExtractError> {
        let outbound = proxied_url(self.proxy_base.as_deref(), url);
        tracing::debug!(url = %url, outbound = %outbound, method = ?request.method, "fetching");

        let method = match request.method {
            FetchMethod::Get => reqwest::Method::GET,
            FetchMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &outbound);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ExtractError::transport(url, e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractError::transport(url, e.to_string()))?;

        Ok(FetchResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}
