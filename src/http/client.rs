//! HTTP client for the Axonaut API
//!
//! Issues exactly one request per [`EndpointDescriptor`]:
//! - API key, content type and accept headers on every call
//! - No body at all when the descriptor body is empty
//! - Every failure folded into [`Error::Transport`]
//!
//! There is no retry loop here. The only re-sends in the crate are the
//! pagination strategy fallbacks, which change the request shape.

use super::descriptor::EndpointDescriptor;
use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::config::{ClientSettings, Credentials, API_KEY_HEADER};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Anything that can turn a descriptor into a JSON response.
///
/// Implemented by [`HttpClient`]; the pagination, search and upsert layers
/// are generic over it.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Issue one call. Fails only with [`Error::Transport`].
    async fn execute(&self, descriptor: &EndpointDescriptor) -> Result<JsonValue>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL every descriptor path is appended to
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit: None,
            default_headers,
            user_agent: format!("axonaut-connector/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Build a client config from loaded settings
    pub fn from_settings(settings: &ClientSettings) -> Self {
        let mut builder = Self::builder()
            .credentials(&settings.credentials)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone());
        if let Some(rate_limit) = &settings.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        builder.build()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set base URL and API key header from credentials
    pub fn credentials(self, credentials: &Credentials) -> Self {
        self.base_url(credentials.base_url.clone())
            .header(API_KEY_HEADER, credentials.api_key.clone())
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client bound to one Axonaut account
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Create a client from loaded settings
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::with_config(HttpClientConfig::from_settings(settings))
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Verify the credentials by fetching the current account
    pub async fn check(&self) -> Result<JsonValue> {
        self.execute(&EndpointDescriptor::get("/me")).await
    }

    /// Send one request and decode the JSON response
    pub async fn send(&self, descriptor: &EndpointDescriptor) -> Result<JsonValue> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let method = descriptor.method;
        let full_url = self.build_url(&descriptor.path);
        let transport_err = |status: Option<u16>, body: String| {
            Error::transport(method.as_str(), descriptor.path.as_str(), status, body)
        };

        let mut req = self.client.request(method.into(), &full_url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &descriptor.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        let query = descriptor.query_pairs();
        if !query.is_empty() {
            req = req.query(&query);
        }

        if descriptor.has_body() {
            req = req.json(&descriptor.body);
        }

        debug!("{} {}", method, full_url);

        let response = req
            .send()
            .await
            .map_err(|e| transport_err(None, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_err(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(transport_err(Some(status.as_u16()), text));
        }

        // DELETE and some PATCH endpoints answer 2xx with nothing
        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            transport_err(
                Some(status.as_u16()),
                format!("invalid JSON response ({e}): {text}"),
            )
        })
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[async_trait]
impl RequestExecutor for HttpClient {
    async fn execute(&self, descriptor: &EndpointDescriptor) -> Result<JsonValue> {
        self.send(descriptor).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
