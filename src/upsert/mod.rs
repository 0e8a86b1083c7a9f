//! Upsert module
//!
//! Create-if-absent-else-update keyed by a caller-chosen field, on top of an
//! API that only offers plain create and partial update.
//!
//! # Concurrency
//!
//! There is no lock and no idempotency key. Two upserts racing on the same
//! match value can both see "no match" and both create a record. Callers
//! that need at-most-one must serialize upserts per key themselves.

mod coordinator;

pub use coordinator::{MatchStrategy, UpsertCoordinator, UpsertOutcome, UpsertRequest};

/// Key under which the taken branch is reported in [`UpsertOutcome::into_json`]
pub const OPERATION_FIELD: &str = "operationPerformed";
