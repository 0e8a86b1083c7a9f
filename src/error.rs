//! Error types for the Axonaut connector
//!
//! Every public API returns `Result<T, Error>` where Error is defined here.
//! The remote exchange itself only ever fails with [`Error::Transport`];
//! the lookup layer adds [`Error::NotFound`].

use thiserror::Error;

/// The main error type for the Axonaut connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Remote API Errors
    // ============================================================================
    /// Any failed HTTP exchange: network failure, non-2xx status or a body
    /// that is not valid JSON. `status` is `None` when no response arrived.
    #[error("{method} {path} failed{}: {body}", status_suffix(.status))]
    Transport {
        method: String,
        path: String,
        status: Option<u16>,
        body: String,
    },

    /// A lookup by identifier scanned the whole collection without a match
    #[error("No record with id '{id}' in {endpoint}")]
    NotFound { id: String, endpoint: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Unknown resource: {name}")]
    UnknownResource { name: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a transport error
    pub fn transport(
        method: impl Into<String>,
        path: impl Into<String>,
        status: Option<u16>,
        body: impl Into<String>,
    ) -> Self {
        Self::Transport {
            method: method.into(),
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an unknown resource error
    pub fn unknown_resource(name: impl Into<String>) -> Self {
        Self::UnknownResource { name: name.into() }
    }

    /// Check if this error came from the remote exchange
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// Check if this error is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status carried by a transport error, if a response arrived
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with HTTP {s}")).unwrap_or_default()
}

/// Result type alias for the Axonaut connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
