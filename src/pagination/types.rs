//! Pagination types
//!
//! The aggregation state machine and the page shape it consumes.

use crate::http::EndpointDescriptor;
use crate::types::{JsonValue, Record};
use tracing::debug;

/// Header and query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "page";

/// Header and query parameter carrying the page size
pub const PER_PAGE_PARAM: &str = "per_page";

/// Caller query key that sets the page size; never forwarded as-is
pub const LIMIT_PARAM: &str = "limit";

/// Envelope key wrapping a collection in an object response
pub const DATA_ENVELOPE: &str = "data";

/// How page parameters travel to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaginationStrategy {
    /// `page` / `per_page` request headers
    #[default]
    Header,
    /// `page` / `per_page` merged into the query string
    Query,
}

impl PaginationStrategy {
    /// Shape `base` into the request for `page` under this strategy
    pub fn apply(self, base: &EndpointDescriptor, page: u32, per_page: u32) -> EndpointDescriptor {
        let descriptor = base.clone();
        match self {
            PaginationStrategy::Header => descriptor
                .header(PAGE_PARAM, page.to_string())
                .header(PER_PAGE_PARAM, per_page.to_string()),
            PaginationStrategy::Query => descriptor
                .query(PAGE_PARAM, page)
                .query(PER_PAGE_PARAM, per_page),
        }
    }
}

impl std::fmt::Display for PaginationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaginationStrategy::Header => f.write_str("header"),
            PaginationStrategy::Query => f.write_str("query"),
        }
    }
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Records of this page, in response order
    pub records: Vec<Record>,
    /// No further page should be requested
    pub is_terminal: bool,
}

impl PageResult {
    /// Normalize a response body into a page.
    ///
    /// A bare array is the page. An object with an array under `data` is an
    /// envelope around the page. Any other object is a single record and
    /// always terminal. `null` is an empty page.
    pub fn from_response(value: JsonValue, per_page: u32) -> Self {
        let (records, count, is_collection) = match value {
            JsonValue::Array(items) => {
                let count = items.len();
                (collect_objects(items), count, true)
            }
            JsonValue::Object(mut map) => match map.remove(DATA_ENVELOPE) {
                Some(JsonValue::Array(items)) => {
                    let count = items.len();
                    (collect_objects(items), count, true)
                }
                Some(other) => {
                    map.insert(DATA_ENVELOPE.to_string(), other);
                    (vec![map], 1, false)
                }
                None => (vec![map], 1, false),
            },
            JsonValue::Null => (Vec::new(), 0, true),
            other => {
                debug!("Ignoring scalar page body: {}", other);
                (Vec::new(), 0, true)
            }
        };

        let is_terminal = !is_collection || count == 0 || count != per_page as usize;
        Self {
            records,
            is_terminal,
        }
    }

    /// Number of records in this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this page holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn collect_objects(items: Vec<JsonValue>) -> Vec<Record> {
    items
        .into_iter()
        .filter_map(|item| match item {
            JsonValue::Object(map) => Some(map),
            other => {
                debug!("Skipping non-object collection element: {}", other);
                None
            }
        })
        .collect()
}

/// Mutable state of one aggregation call. Built at the start of the call
/// and dropped at its end.
#[derive(Debug, Clone)]
pub struct AggregationState {
    /// Current page number, 1-based
    pub page: u32,
    /// Requested page size
    pub per_page: u32,
    /// Records gathered so far, in page-arrival order
    pub records: Vec<Record>,
    /// Strategy for the current and all later pages
    pub strategy: PaginationStrategy,
}

impl AggregationState {
    /// Fresh state on page 1 with header pagination
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page,
            records: Vec::new(),
            strategy: PaginationStrategy::Header,
        }
    }

    /// Switch to query pagination for the rest of the call
    pub fn fall_back_to_query(&mut self) {
        self.strategy = PaginationStrategy::Query;
    }

    /// Append a page's records
    pub fn push_page(&mut self, page: PageResult) {
        self.records.extend(page.records);
    }

    /// Advance to the next page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Give up the accumulated records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
