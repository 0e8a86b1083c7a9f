//! Resource catalog
//!
//! The Axonaut resources known to this crate, embedded in the binary so
//! `axonaut get company 42` works without any definition file. Each entry
//! says where the collection lives, how its records are labelled and which
//! lookups the API offers natively.

mod catalog;

pub use catalog::{builtin, Catalog, NestedDef, ResourceDef, BUILTIN_CATALOG_YAML};
