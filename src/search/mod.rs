//! Search module
//!
//! Client-side emulation of lookups the Axonaut API does not offer:
//!
//! - **By id**: full-collection scan when no `GET /{resource}/{id}` exists
//! - **By field**: first exact match, used to decide upserts
//! - **Pickers**: labelled, filtered, sorted options for interactive forms
//! - **Nested**: the same walks over child collections of every parent

mod display;
mod emulator;

pub use display::{
    compare_labels, filter_and_sort, matches_filter, DisplayNameSpec, LabelExtra, ListOption,
    NameFieldSpec, ParentLabel,
};
pub use emulator::{
    find_record_by_field, find_record_by_id, nested_path, NestedCollection, SearchEmulator,
};
