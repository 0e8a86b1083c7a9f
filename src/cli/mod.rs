//! CLI module
//!
//! Command-line interface over the Axonaut API.
//!
//! # Commands
//!
//! - `check` - Verify the API key against `GET /me`
//! - `get` - One record by id, scanning when no direct endpoint exists
//! - `list` - Every record of a collection, all pages
//! - `search` - Labelled, filtered, sorted options
//! - `upsert` - Update the record matching a field, or create it
//! - `resources` - Known resource names

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

#[cfg(test)]
mod tests;
