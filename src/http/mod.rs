//! HTTP module
//!
//! The request executor: one descriptor in, one JSON value or one
//! `Error::Transport` out.
//!
//! # Features
//!
//! - **Descriptors**: method, path, body, query and headers of a single call
//! - **Single attempt**: no retries at this layer
//! - **Rate Limiting**: optional token bucket using governor

mod client;
mod descriptor;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestExecutor};
pub use descriptor::EndpointDescriptor;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
