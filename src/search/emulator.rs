//! In-memory lookups over fetched collections
//!
//! The API has no get-by-id for some resources, no "find by field" for
//! upserts and no text search for pickers. Each of those is emulated by
//! fetching the collection through the [`Aggregator`] and scanning it.

use super::display::{filter_and_sort, matches_filter, DisplayNameSpec, ListOption, ParentLabel};
use crate::config::PaginationSettings;
use crate::error::{Error, Result};
use crate::http::{EndpointDescriptor, RequestExecutor};
use crate::pagination::Aggregator;
use crate::types::{scalar_to_string, JsonValue, Record};
use tracing::{debug, warn};

/// First record whose `id_field` stringifies to `target_id`
pub fn find_record_by_id<'r>(
    records: &'r [Record],
    id_field: &str,
    target_id: &str,
) -> Option<&'r Record> {
    records.iter().find(|record| {
        record
            .get(id_field)
            .and_then(scalar_to_string)
            .is_some_and(|id| id == target_id)
    })
}

/// First record whose `field` is exactly `expected`
pub fn find_record_by_field<'r>(
    records: &'r [Record],
    field: &str,
    expected: &JsonValue,
) -> Option<&'r Record> {
    records
        .iter()
        .find(|record| record.get(field) == Some(expected))
}

/// Path of a child collection under one parent record
pub fn nested_path(parent_path: &str, parent_id: &str, child_segment: &str) -> String {
    format!(
        "{}/{}/{}",
        parent_path.trim_end_matches('/'),
        parent_id,
        child_segment.trim_matches('/')
    )
}

/// Parent-child walk for resources that only exist under a parent record,
/// such as addresses and documents under companies
#[derive(Debug, Clone)]
pub struct NestedCollection {
    /// Parent collection, e.g. `GET /companies`
    pub parents: EndpointDescriptor,
    /// How parents are identified and named
    pub parent_display: DisplayNameSpec,
    /// Child segment appended to `/{parent path}/{parent id}/`
    pub child_segment: String,
    /// How children are identified and named
    pub child_display: DisplayNameSpec,
    /// How the parent name is attached to child labels
    pub parent_label: ParentLabel,
}

/// Search and filter operations over remote collections
pub struct SearchEmulator<'a, E: RequestExecutor + ?Sized> {
    aggregator: Aggregator<'a, E>,
}

impl<'a, E: RequestExecutor + ?Sized> SearchEmulator<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self {
            aggregator: Aggregator::new(executor),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: PaginationSettings) -> Self {
        self.aggregator = self.aggregator.with_settings(settings);
        self
    }

    /// The aggregator used for every fetch
    pub fn aggregator(&self) -> &Aggregator<'a, E> {
        &self.aggregator
    }

    /// Get one record from a collection that has no direct get endpoint.
    ///
    /// Identifiers are compared as strings on both sides. A miss after the
    /// full scan is [`Error::NotFound`].
    pub async fn find_by_id(
        &self,
        collection: &EndpointDescriptor,
        id_field: &str,
        target_id: &str,
    ) -> Result<Record> {
        let records = self.aggregator.collect_all(collection).await?;
        debug!(
            "Scanning {} records of {} for {}={}",
            records.len(),
            collection.path,
            id_field,
            target_id
        );
        find_record_by_id(&records, id_field, target_id)
            .cloned()
            .ok_or_else(|| Error::not_found(target_id, collection.path.as_str()))
    }

    /// Labelled options for a picker, filtered by `filter_text` and sorted.
    ///
    /// Never fails: any fetch error yields an empty list.
    pub async fn list_with_display_names(
        &self,
        collection: &EndpointDescriptor,
        display: &DisplayNameSpec,
        filter_text: Option<&str>,
    ) -> Vec<ListOption> {
        let records = match self.aggregator.collect_all(collection).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Lookup on {} failed, returning no options: {}", collection.path, e);
                return Vec::new();
            }
        };

        let options = records.iter().filter_map(|r| display.option(r)).collect();
        filter_and_sort(options, filter_text)
    }

    /// First record whose `field_name` equals `expected_value`, or `None`.
    ///
    /// Absence is a normal outcome here, unlike [`find_by_id`](Self::find_by_id).
    pub async fn find_by_field(
        &self,
        collection: &EndpointDescriptor,
        field_name: &str,
        expected_value: &JsonValue,
    ) -> Result<Option<Record>> {
        let records = self.aggregator.collect_all(collection).await?;
        Ok(find_record_by_field(&records, field_name, expected_value).cloned())
    }

    /// [`find_by_id`](Self::find_by_id) across every parent's child collection.
    ///
    /// Parents are walked in collection order and the first matching child
    /// wins. A parent whose children cannot be fetched is skipped.
    pub async fn find_nested_by_id(
        &self,
        nested: &NestedCollection,
        target_id: &str,
    ) -> Result<Record> {
        let parents = self.aggregator.collect_all(&nested.parents).await?;

        for parent in &parents {
            let Some(parent_id) = nested.parent_display.id_of(parent) else {
                continue;
            };
            let path = nested_path(&nested.parents.path, &parent_id, &nested.child_segment);
            match self
                .aggregator
                .collect_all(&EndpointDescriptor::get(path.as_str()))
                .await
            {
                Ok(children) => {
                    if let Some(found) =
                        find_record_by_id(&children, &nested.child_display.id_field, target_id)
                    {
                        return Ok(found.clone());
                    }
                }
                Err(e) => warn!("Skipping {}: {}", path, e),
            }
        }

        Err(Error::not_found(
            target_id,
            nested_path(&nested.parents.path, "*", &nested.child_segment),
        ))
    }

    /// Picker options for child records under the first `parent_limit`
    /// parents, each labelled with its parent per [`ParentLabel`]. With
    /// [`ParentLabel::Parens`] the filter applies to the child label alone;
    /// with [`ParentLabel::Brackets`] it applies to the joined label.
    ///
    /// Same silent-empty policy as
    /// [`list_with_display_names`](Self::list_with_display_names).
    pub async fn list_nested_with_display_names(
        &self,
        nested: &NestedCollection,
        parent_limit: usize,
        filter_text: Option<&str>,
    ) -> Vec<ListOption> {
        let parents = match self.aggregator.collect_all(&nested.parents).await {
            Ok(parents) => parents,
            Err(e) => {
                warn!(
                    "Lookup on {} failed, returning no options: {}",
                    nested.parents.path, e
                );
                return Vec::new();
            }
        };

        let mut options = Vec::new();
        for parent in parents.iter().take(parent_limit) {
            let Some(parent_id) = nested.parent_display.id_of(parent) else {
                continue;
            };
            let parent_label = nested.parent_display.label(parent);
            let path = nested_path(&nested.parents.path, &parent_id, &nested.child_segment);

            let children = match self
                .aggregator
                .collect_all(&EndpointDescriptor::get(path.as_str()))
                .await
            {
                Ok(children) => children,
                Err(e) => {
                    warn!("Skipping {}: {}", path, e);
                    continue;
                }
            };

            let style = nested.parent_label;
            for option in children
                .iter()
                .filter_map(|child| nested.child_display.option(child))
            {
                let label = style.join(&option.label, &parent_label);
                let searched = if style.filters_parent() {
                    &label
                } else {
                    &option.label
                };
                if matches_filter(searched, filter_text) {
                    options.push(ListOption {
                        label,
                        value: option.value,
                    });
                }
            }
        }

        filter_and_sort(options, None)
    }
}
