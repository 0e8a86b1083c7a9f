//! Catalog definitions and the operations routed through them

use crate::config::PaginationSettings;
use crate::error::{Error, Result};
use crate::http::{EndpointDescriptor, RequestExecutor};
use crate::search::{
    DisplayNameSpec, LabelExtra, ListOption, NameFieldSpec, NestedCollection, ParentLabel,
    SearchEmulator,
};
use crate::types::{JsonValue, Record};
use crate::upsert::{MatchStrategy, UpsertRequest};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// Catalog shipped with the binary
pub const BUILTIN_CATALOG_YAML: &str = include_str!("../../catalog/axonaut.yaml");

static BUILTIN: LazyLock<std::result::Result<Catalog, String>> =
    LazyLock::new(|| Catalog::from_yaml(BUILTIN_CATALOG_YAML).map_err(|e| e.to_string()));

/// The embedded catalog
pub fn builtin() -> Result<&'static Catalog> {
    BUILTIN
        .as_ref()
        .map_err(|e| Error::config(format!("Embedded resource catalog is invalid: {e}")))
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_true() -> bool {
    true
}

/// A top-level collection such as `/companies`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub key: String,
    pub path: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: NameFieldSpec,
    #[serde(default)]
    pub extras: Vec<LabelExtra>,
    /// Whether `GET {path}/{id}` exists
    #[serde(default = "default_true")]
    pub direct_get: bool,
    /// Field the collection endpoint accepts as a query filter
    #[serde(default)]
    pub upsert_filter: Option<String>,
}

impl ResourceDef {
    pub fn collection(&self) -> EndpointDescriptor {
        EndpointDescriptor::get(self.path.as_str())
    }

    pub fn display(&self) -> DisplayNameSpec {
        DisplayNameSpec::new(
            self.id_field.as_str(),
            self.name.clone(),
            self.resource_type.as_str(),
        )
        .with_extras(self.extras.clone())
    }

    /// Server-side filtering only when upserting on the declared filter field
    pub fn match_strategy(&self, match_field: &str) -> MatchStrategy {
        match &self.upsert_filter {
            Some(field) if field == match_field => MatchStrategy::ServerFilter,
            _ => MatchStrategy::ScanCollection,
        }
    }

    /// Path segment without the leading slash, accepted as an alias
    fn plural(&self) -> &str {
        self.path.trim_start_matches('/')
    }
}

/// A collection that only exists under each record of a parent resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedDef {
    pub key: String,
    /// Key of the parent resource
    pub parent: String,
    pub segment: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: NameFieldSpec,
    #[serde(default)]
    pub extras: Vec<LabelExtra>,
    #[serde(default)]
    pub parent_label: ParentLabel,
    /// Parents walked when building picker options
    pub parent_limit: usize,
}

impl NestedDef {
    pub fn display(&self) -> DisplayNameSpec {
        DisplayNameSpec::new(
            self.id_field.as_str(),
            self.name.clone(),
            self.resource_type.as_str(),
        )
        .with_extras(self.extras.clone())
    }
}

/// All known resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
    #[serde(default)]
    pub nested: Vec<NestedDef>,
}

impl Catalog {
    /// Parse and validate a catalog document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        let keys = self
            .resources
            .iter()
            .map(|r| r.key.as_str())
            .chain(self.nested.iter().map(|n| n.key.as_str()));
        for key in keys {
            if !seen.insert(key) {
                return Err(Error::config(format!("Duplicate resource key '{key}'")));
            }
        }

        for resource in &self.resources {
            if !resource.path.starts_with('/') {
                return Err(Error::config(format!(
                    "Resource '{}' path must start with '/': {}",
                    resource.key, resource.path
                )));
            }
        }

        for nested in &self.nested {
            if self.resource(&nested.parent).is_none() {
                return Err(Error::config(format!(
                    "Nested resource '{}' has unknown parent '{}'",
                    nested.key, nested.parent
                )));
            }
        }
        Ok(())
    }

    fn resource(&self, name: &str) -> Option<&ResourceDef> {
        self.resources
            .iter()
            .find(|r| r.key == name || r.plural() == name)
    }

    /// Top-level resource by key (`company`) or collection name (`companies`)
    pub fn get(&self, name: &str) -> Result<&ResourceDef> {
        self.resource(name)
            .ok_or_else(|| Error::unknown_resource(name))
    }

    /// Nested resource by key or segment
    pub fn nested(&self, name: &str) -> Option<&NestedDef> {
        self.nested
            .iter()
            .find(|n| n.key == name || n.segment == name)
    }

    /// Every key, top-level first, in catalog order
    pub fn keys(&self) -> Vec<&str> {
        self.resources
            .iter()
            .map(|r| r.key.as_str())
            .chain(self.nested.iter().map(|n| n.key.as_str()))
            .collect()
    }

    /// Parent walk for a nested resource
    pub fn nested_collection(&self, nested: &NestedDef) -> Result<NestedCollection> {
        let parent = self.get(&nested.parent)?;
        Ok(NestedCollection {
            parents: parent.collection(),
            parent_display: parent.display(),
            child_segment: nested.segment.clone(),
            child_display: nested.display(),
            parent_label: nested.parent_label,
        })
    }

    /// One record by id, through the direct endpoint when the API has one
    /// and a collection scan otherwise
    pub async fn get_record<E: RequestExecutor + ?Sized>(
        &self,
        executor: &E,
        settings: PaginationSettings,
        name: &str,
        id: &str,
    ) -> Result<JsonValue> {
        let search = SearchEmulator::new(executor).with_settings(settings);

        if let Some(nested) = self.nested(name) {
            let walk = self.nested_collection(nested)?;
            let record = search.find_nested_by_id(&walk, id).await?;
            return Ok(JsonValue::Object(record));
        }

        let resource = self.get(name)?;
        if resource.direct_get {
            let path = format!("{}/{}", resource.path.trim_end_matches('/'), id);
            debug!("Direct get {}", path);
            executor.execute(&EndpointDescriptor::get(path)).await
        } else {
            debug!("{} has no direct get, scanning {}", resource.key, resource.path);
            let record = search
                .find_by_id(&resource.collection(), &resource.id_field, id)
                .await?;
            Ok(JsonValue::Object(record))
        }
    }

    /// Records of a top-level resource, truncated to `limit`
    pub async fn list_records<E: RequestExecutor + ?Sized>(
        &self,
        executor: &E,
        settings: PaginationSettings,
        name: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        let resource = self.get(name)?;
        SearchEmulator::new(executor)
            .with_settings(settings)
            .aggregator()
            .collect_limited(&resource.collection(), limit)
            .await
    }

    /// Picker options for any resource, nested ones included
    pub async fn search_options<E: RequestExecutor + ?Sized>(
        &self,
        executor: &E,
        settings: PaginationSettings,
        name: &str,
        filter: Option<&str>,
    ) -> Result<Vec<ListOption>> {
        let search = SearchEmulator::new(executor).with_settings(settings);

        if let Some(nested) = self.nested(name) {
            let walk = self.nested_collection(nested)?;
            return Ok(search
                .list_nested_with_display_names(&walk, nested.parent_limit, filter)
                .await);
        }

        let resource = self.get(name)?;
        Ok(search
            .list_with_display_names(&resource.collection(), &resource.display(), filter)
            .await)
    }

    /// Upsert request against a top-level resource, with the match strategy
    /// the resource supports for `match_field`
    pub fn upsert_request(
        &self,
        name: &str,
        match_field: &str,
        match_value: JsonValue,
    ) -> Result<UpsertRequest> {
        let resource = self.get(name)?;
        Ok(
            UpsertRequest::new(resource.collection(), match_field, match_value)
                .id_field(resource.id_field.as_str())
                .strategy(resource.match_strategy(match_field)),
        )
    }
}
