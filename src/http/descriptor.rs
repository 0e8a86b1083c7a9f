//! Endpoint descriptors
//!
//! An [`EndpointDescriptor`] is the complete shape of one outbound call.
//! Callers build a fresh one per call; the executor never mutates it.

use crate::types::{scalar_to_string, JsonObject, JsonValue, Method};
use std::collections::BTreeMap;

/// Method, path, body, query and extra headers of a single API call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointDescriptor {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API base URL (e.g. `/companies/42`)
    pub path: String,
    /// JSON body fields. Empty means no body is sent at all.
    pub body: JsonObject,
    /// Query string fields
    pub query: JsonObject,
    /// Extra request headers on top of the client defaults
    pub headers: BTreeMap<String, String>,
}

impl EndpointDescriptor {
    /// Create a descriptor with the given method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    /// GET descriptor
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST descriptor with a body
    pub fn post(path: impl Into<String>, body: JsonObject) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// PATCH descriptor with a body
    pub fn patch(path: impl Into<String>, body: JsonObject) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    /// DELETE descriptor
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: JsonObject) -> Self {
        self.body = body;
        self
    }

    /// Replace the whole query mapping
    #[must_use]
    pub fn with_query(mut self, query: JsonObject) -> Self {
        self.query = query;
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Whether a body payload should be attached
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Query mapping flattened to string pairs. `null` values are dropped,
    /// arrays repeat the key once per element, objects are sent as JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.query.len());
        for (key, value) in &self.query {
            match value {
                JsonValue::Null => {}
                JsonValue::Array(items) => {
                    for item in items {
                        if let Some(s) = scalar_to_string(item) {
                            pairs.push((key.clone(), s));
                        }
                    }
                }
                JsonValue::Object(_) => pairs.push((key.clone(), value.to_string())),
                scalar => {
                    if let Some(s) = scalar_to_string(scalar) {
                        pairs.push((key.clone(), s));
                    }
                }
            }
        }
        pairs
    }
}
