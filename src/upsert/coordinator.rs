//! Upsert coordination
//!
//! One lookup, then exactly one write: `PATCH` on the first match or `POST`
//! to the collection when nothing matched.

use super::OPERATION_FIELD;
use crate::config::PaginationSettings;
use crate::error::{Error, Result};
use crate::http::{EndpointDescriptor, RequestExecutor};
use crate::pagination::PageResult;
use crate::search::{find_record_by_field, SearchEmulator};
use crate::types::{scalar_to_string, JsonObject, JsonValue, OperationPerformed, Record};
use tracing::{debug, info};

/// How the existing record is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Fetch the whole collection and scan it
    #[default]
    ScanCollection,
    /// Ask the server to filter with `?{field}={value}` and scan the reply.
    /// Only for endpoints known to honor the filter (employees by email).
    ServerFilter,
}

/// Everything one upsert needs
#[derive(Debug, Clone)]
pub struct UpsertRequest {
    /// Collection endpoint, e.g. `GET /companies`
    pub collection: EndpointDescriptor,
    /// Field deciding identity
    pub match_field: String,
    /// Value the field must equal
    pub match_value: JsonValue,
    /// Fields written on both branches
    pub patch_fields: JsonObject,
    /// Extra fields written only on create
    pub create_defaults: JsonObject,
    /// Identifier field of matched records
    pub id_field: String,
    /// Lookup strategy
    pub strategy: MatchStrategy,
}

impl UpsertRequest {
    pub fn new(
        collection: EndpointDescriptor,
        match_field: impl Into<String>,
        match_value: impl Into<JsonValue>,
    ) -> Self {
        Self {
            collection,
            match_field: match_field.into(),
            match_value: match_value.into(),
            patch_fields: JsonObject::new(),
            create_defaults: JsonObject::new(),
            id_field: "id".to_string(),
            strategy: MatchStrategy::default(),
        }
    }

    #[must_use]
    pub fn patch_fields(mut self, fields: JsonObject) -> Self {
        self.patch_fields = fields;
        self
    }

    #[must_use]
    pub fn create_defaults(mut self, fields: JsonObject) -> Self {
        self.create_defaults = fields;
        self
    }

    #[must_use]
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Create body: defaults, then the match key, then the patch fields
    pub fn create_body(&self) -> JsonObject {
        let mut body = self.create_defaults.clone();
        body.insert(self.match_field.clone(), self.match_value.clone());
        body.extend(self.patch_fields.clone());
        body
    }
}

/// Result of one upsert
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    /// Response of the write call
    pub record: JsonValue,
    /// Branch taken
    pub operation_performed: OperationPerformed,
}

impl UpsertOutcome {
    /// The written record with `operationPerformed` added. Non-object
    /// responses are wrapped under `data`.
    pub fn into_json(self) -> JsonValue {
        let operation = JsonValue::from(self.operation_performed.as_str());
        let mut map = match self.record {
            JsonValue::Object(map) => map,
            JsonValue::Null => JsonObject::new(),
            other => {
                let mut map = JsonObject::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert(OPERATION_FIELD.to_string(), operation);
        JsonValue::Object(map)
    }
}

/// Runs lookup-then-write upserts
pub struct UpsertCoordinator<'a, E: RequestExecutor + ?Sized> {
    executor: &'a E,
    search: SearchEmulator<'a, E>,
}

impl<'a, E: RequestExecutor + ?Sized> UpsertCoordinator<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            search: SearchEmulator::new(executor),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: PaginationSettings) -> Self {
        self.search = self.search.with_settings(settings);
        self
    }

    /// Update the first record matching the key, or create one.
    ///
    /// Exactly one write is issued. Any transport failure aborts the upsert
    /// and is returned unchanged.
    ///
    /// # Errors
    ///
    /// Besides transport failures, a matched record that lacks `id_field`
    /// (or holds a non-scalar there) yields [`Error::Other`] naming the
    /// collection and the field. No write is sent in that case.
    pub async fn upsert(&self, request: &UpsertRequest) -> Result<UpsertOutcome> {
        let existing = self.find_existing(request).await?;

        match existing {
            Some(record) => {
                let id = record
                    .get(&request.id_field)
                    .and_then(scalar_to_string)
                    .ok_or_else(|| {
                        Error::Other(format!(
                            "matched record in {} has no '{}' field",
                            request.collection.path, request.id_field
                        ))
                    })?;
                let path = format!("{}/{}", request.collection.path.trim_end_matches('/'), id);
                info!(
                    "Upsert on {}: {}={} matched {}, updating",
                    request.collection.path, request.match_field, request.match_value, id
                );
                let updated = self
                    .executor
                    .execute(&EndpointDescriptor::patch(
                        path,
                        request.patch_fields.clone(),
                    ))
                    .await?;
                Ok(UpsertOutcome {
                    record: updated,
                    operation_performed: OperationPerformed::Updated,
                })
            }
            None => {
                info!(
                    "Upsert on {}: no record with {}={}, creating",
                    request.collection.path, request.match_field, request.match_value
                );
                let created = self
                    .executor
                    .execute(&EndpointDescriptor::post(
                        request.collection.path.as_str(),
                        request.create_body(),
                    ))
                    .await?;
                Ok(UpsertOutcome {
                    record: created,
                    operation_performed: OperationPerformed::Created,
                })
            }
        }
    }

    async fn find_existing(&self, request: &UpsertRequest) -> Result<Option<Record>> {
        match request.strategy {
            MatchStrategy::ScanCollection => {
                self.search
                    .find_by_field(
                        &request.collection,
                        &request.match_field,
                        &request.match_value,
                    )
                    .await
            }
            MatchStrategy::ServerFilter => {
                let lookup = request
                    .collection
                    .clone()
                    .query(request.match_field.as_str(), request.match_value.clone());
                let response = self.executor.execute(&lookup).await?;
                let candidates = PageResult::from_response(response, u32::MAX).records;
                debug!(
                    "Server filter on {} returned {} candidates",
                    request.collection.path,
                    candidates.len()
                );
                Ok(
                    find_record_by_field(&candidates, &request.match_field, &request.match_value)
                        .cloned(),
                )
            }
        }
    }
}
