//! Pagination module
//!
//! Supports: header pagination, query pagination, unpaged fallback
//!
//! # Overview
//!
//! Axonaut endpoints do not agree on how page parameters are passed. The
//! [`Aggregator`] discovers the convention per call: header first, query
//! after the first header failure, and one unpaged request as a last resort.
//! Iteration stops on a short page or at the page cap.

mod aggregator;
mod types;

pub use aggregator::Aggregator;
pub use types::{
    AggregationState, PageResult, PaginationStrategy, DATA_ENVELOPE, LIMIT_PARAM, PAGE_PARAM,
    PER_PAGE_PARAM,
};

#[cfg(test)]
mod tests;
