// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Axonaut Connector
//!
//! Client for the Axonaut CRM/ERP REST API that fills in what the API does
//! not offer natively.
//!
//! ## Features
//!
//! - **Pagination**: header-driven paging with a query-parameter fallback and
//!   a final unpaged attempt, bounded to 50 pages
//! - **Search**: get-by-id for collections without a direct endpoint, and
//!   labelled, filtered, sorted picker options
//! - **Upsert**: update the record matching a field, or create it
//! - **Resource catalog**: every known collection embedded in the binary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use axonaut_connector::{resources, ClientSettings, Credentials, HttpClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = ClientSettings::new(Credentials::new("my-api-key"));
//!     let client = HttpClient::from_settings(&settings)?;
//!
//!     // Verify the key
//!     client.check().await?;
//!
//!     // Payslips have no direct get; this scans the collection
//!     let catalog = resources::builtin()?;
//!     let payslip = catalog
//!         .get_record(&client, settings.pagination, "payslip", "42")
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Resource catalog                          │
//! │  get_record()   list_records()   search_options()   upsert      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴────────────┬────────────────────┐
//! │    Upsert     │          Search           │     Pagination     │
//! ├───────────────┼───────────────────────────┼────────────────────┤
//! │ Scan / filter │ Find by id / field        │ Header → Query     │
//! │ PATCH or POST │ Labels, filter, sort      │ → Unpaged          │
//! │               │ Nested walks              │ 50 page cap        │
//! └───────────────┴───────────────────────────┴────────────────────┘
//!                                │
//!                  HTTP client (userApiKey, rate limit)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Settings and credentials
pub mod config;

/// HTTP client with rate limiting
pub mod http;

/// Page aggregation
pub mod pagination;

/// Client-side lookups and picker options
pub mod search;

/// Create-or-update on top of create and partial update
pub mod upsert;

/// Built-in resource catalog
pub mod resources;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{ClientSettings, Credentials, SettingsFile};
pub use http::{EndpointDescriptor, HttpClient, RequestExecutor};
pub use pagination::Aggregator;
pub use search::SearchEmulator;
pub use upsert::{UpsertCoordinator, UpsertRequest};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
