//! Connector settings
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, a settings file (JSON or YAML), and `AXONAUT_*` environment
//! variables. Each layer is a [`SettingsFile`] with every field optional;
//! [`SettingsFile::resolve`] turns the merged layers into [`ClientSettings`].

use crate::error::{Error, Result, ResultExt};
use crate::http::RateLimiterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://axonaut.com/api/v2";

/// Header carrying the account API key
pub const API_KEY_HEADER: &str = "userApiKey";

/// Environment variable names
pub const ENV_API_KEY: &str = "AXONAUT_API_KEY";
pub const ENV_BASE_URL: &str = "AXONAUT_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "AXONAUT_TIMEOUT_SECS";

// ============================================================================
// Resolved Settings
// ============================================================================

/// Account credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// API key sent in the `userApiKey` header
    pub api_key: String,
    /// API root, without trailing slash
    pub base_url: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Paging knobs for collection aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Page size when the caller gives no `limit`
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    /// Hard cap on pages fetched by one aggregation
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    50
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_pages: default_max_pages(),
        }
    }
}

/// Fully resolved client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub credentials: Credentials,
    pub timeout_secs: u64,
    pub rate_limit: Option<RateLimiterConfig>,
    pub user_agent: String,
    pub pagination: PaginationSettings,
}

impl ClientSettings {
    /// Settings with defaults for everything but the credentials
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout_secs: 30,
            rate_limit: None,
            user_agent: format!("axonaut-connector/{}", env!("CARGO_PKG_VERSION")),
            pagination: PaginationSettings::default(),
        }
    }

    /// Load from an optional file layered over the process environment
    pub fn load(path: Option<&Path>, overrides: SettingsFile) -> Result<Self> {
        let file = match path {
            Some(path) => SettingsFile::from_path(path)?,
            None => SettingsFile::default(),
        };
        overrides
            .merge(file)
            .merge(SettingsFile::from_env()?)
            .resolve()
    }
}

// ============================================================================
// Settings Layers
// ============================================================================

/// One layer of partially specified settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub pagination: Option<PaginationSettings>,
}

impl SettingsFile {
    /// Read a settings file; `.yaml`/`.yml` parse as YAML, anything else as JSON
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Read the `AXONAUT_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read variables through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                Error::config(format!(
                    "{ENV_TIMEOUT_SECS} must be an integer number of seconds, got '{raw}'"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            api_key: lookup(ENV_API_KEY),
            base_url: lookup(ENV_BASE_URL),
            timeout_secs,
            ..Default::default()
        })
    }

    /// Fill unset fields from a lower-precedence layer
    #[must_use]
    pub fn merge(self, lower: SettingsFile) -> Self {
        Self {
            api_key: self.api_key.or(lower.api_key),
            base_url: self.base_url.or(lower.base_url),
            timeout_secs: self.timeout_secs.or(lower.timeout_secs),
            rate_limit: self.rate_limit.or(lower.rate_limit),
            user_agent: self.user_agent.or(lower.user_agent),
            pagination: self.pagination.or(lower.pagination),
        }
    }

    /// Validate and apply defaults
    pub fn resolve(self) -> Result<ClientSettings> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::missing_field("api_key"))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut settings = ClientSettings::new(Credentials { api_key, base_url });
        if let Some(timeout_secs) = self.timeout_secs {
            if timeout_secs == 0 {
                return Err(Error::config("timeout_secs must be greater than zero"));
            }
            settings.timeout_secs = timeout_secs;
        }
        settings.rate_limit = self.rate_limit;
        if let Some(user_agent) = self.user_agent {
            settings.user_agent = user_agent;
        }
        if let Some(pagination) = self.pagination {
            if pagination.default_per_page == 0 || pagination.max_pages == 0 {
                return Err(Error::config(
                    "pagination.default_per_page and pagination.max_pages must be positive",
                ));
            }
            settings.pagination = pagination;
        }

        Ok(settings)
    }
}
