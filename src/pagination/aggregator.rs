//! Collection aggregation across pages
//!
//! Endpoints disagree on where page parameters go. Each aggregation starts
//! with header pagination; the first failure commits the call to query
//! pagination, and a failure there falls back to one unpaged GET whose
//! payload is taken as the whole collection.

use super::types::{AggregationState, PageResult, PaginationStrategy, LIMIT_PARAM};
use crate::config::PaginationSettings;
use crate::error::Result;
use crate::http::{EndpointDescriptor, RequestExecutor};
use crate::types::{JsonObject, JsonValue, Method, Record};
use tracing::{debug, warn};

/// Outcome of fetching one page
enum Fetched {
    /// A regular page under the current strategy
    Page(JsonValue),
    /// The unpaged fallback answered; this is the entire collection
    Complete(JsonValue),
}

/// Collects every record of a paged collection
pub struct Aggregator<'a, E: RequestExecutor + ?Sized> {
    executor: &'a E,
    settings: PaginationSettings,
}

impl<'a, E: RequestExecutor + ?Sized> Aggregator<'a, E> {
    /// Aggregator with default page size (100) and page cap (50)
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            settings: PaginationSettings::default(),
        }
    }

    /// Override page size and page cap
    #[must_use]
    pub fn with_settings(mut self, settings: PaginationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Pagination settings in use
    pub fn settings(&self) -> PaginationSettings {
        self.settings
    }

    /// Fetch every page of the collection described by `descriptor`.
    ///
    /// A `limit` query entry sets the page size and is not forwarded. Records
    /// come back in page-arrival order without deduplication.
    pub async fn collect_all(&self, descriptor: &EndpointDescriptor) -> Result<Vec<Record>> {
        let per_page = self.page_size(descriptor);
        let mut base = descriptor.clone();
        base.query.remove(LIMIT_PARAM);

        let mut state = AggregationState::new(per_page);

        loop {
            match self.fetch_page(&base, &mut state).await? {
                Fetched::Page(value) => {
                    let page = PageResult::from_response(value, per_page);
                    let is_terminal = page.is_terminal;
                    debug!(
                        "{} page {} returned {} records ({} pagination)",
                        base.path,
                        state.page,
                        page.len(),
                        state.strategy
                    );
                    state.push_page(page);

                    if is_terminal {
                        break;
                    }
                    if state.page >= self.settings.max_pages {
                        warn!(
                            "{} stopped at the {}-page cap with {} records of {} per page; \
                             the collection may be larger or ignore page parameters",
                            base.path,
                            self.settings.max_pages,
                            state.records.len(),
                            per_page
                        );
                        break;
                    }
                    state.next_page();
                }
                Fetched::Complete(value) => {
                    let page = PageResult::from_response(value, per_page);
                    debug!(
                        "{} unpaged request returned {} records",
                        base.path,
                        page.len()
                    );
                    return Ok(page.records);
                }
            }
        }

        Ok(state.into_records())
    }

    /// [`collect_all`](Self::collect_all), truncated to at most `limit` records
    pub async fn collect_limited(
        &self,
        descriptor: &EndpointDescriptor,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        let mut records = self.collect_all(descriptor).await?;
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    fn page_size(&self, descriptor: &EndpointDescriptor) -> u32 {
        descriptor
            .query
            .get(LIMIT_PARAM)
            .and_then(|v| match v {
                JsonValue::Number(n) => n.as_u64(),
                JsonValue::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .filter(|n| *n > 0)
            .map_or(self.settings.default_per_page, |n| {
                u32::try_from(n).unwrap_or(u32::MAX)
            })
    }

    async fn fetch_page(
        &self,
        base: &EndpointDescriptor,
        state: &mut AggregationState,
    ) -> Result<Fetched> {
        if state.strategy == PaginationStrategy::Header {
            let request = PaginationStrategy::Header.apply(base, state.page, state.per_page);
            match self.executor.execute(&request).await {
                Ok(value) => return Ok(Fetched::Page(value)),
                Err(e) => {
                    warn!(
                        "{} rejected header pagination on page {} ({}); using query pagination",
                        base.path, state.page, e
                    );
                    state.fall_back_to_query();
                }
            }
        }

        let request = PaginationStrategy::Query.apply(base, state.page, state.per_page);
        match self.executor.execute(&request).await {
            Ok(value) => Ok(Fetched::Page(value)),
            Err(e) => {
                warn!(
                    "{} rejected query pagination on page {} ({}); trying one unpaged request",
                    base.path, state.page, e
                );
                let value = self.executor.execute(&unpaged(base)).await?;
                Ok(Fetched::Complete(value))
            }
        }
    }
}

/// The last-resort request: a plain GET of the collection with its filters
/// kept and no body.
fn unpaged(base: &EndpointDescriptor) -> EndpointDescriptor {
    EndpointDescriptor {
        method: Method::GET,
        body: JsonObject::new(),
        ..base.clone()
    }
}
