//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ClientSettings, SettingsFile};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::resources::{self, Catalog};
use crate::types::{JsonObject, JsonValue};
use crate::upsert::UpsertCoordinator;
use anyhow::Context as _;
use serde_json::json;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, printing every output message
    pub async fn run(&self) -> Result<()> {
        for message in self.execute().await? {
            println!("{}", self.render(&message));
        }
        Ok(())
    }

    /// Run the CLI command and return its output messages
    pub async fn execute(&self) -> Result<Vec<JsonValue>> {
        let catalog = resources::builtin()?;

        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Get { resource, id } => self.get(catalog, resource, id).await,
            Commands::List { resource, limit } => self.list(catalog, resource, *limit).await,
            Commands::Search { resource, filter } => {
                self.search(catalog, resource, filter.as_deref()).await
            }
            Commands::Upsert {
                resource,
                field,
                value,
                json_value,
                data,
                defaults,
            } => {
                let value = parse_match_value(value, *json_value)?;
                self.upsert(
                    catalog,
                    resource,
                    field,
                    value,
                    data.as_deref(),
                    defaults.as_deref(),
                )
                .await
            }
            Commands::Resources => Ok(vec![Self::list_resources(catalog)]),
        }
    }

    /// Flags over settings file over environment
    fn load_settings(&self) -> Result<ClientSettings> {
        let overrides = SettingsFile {
            api_key: self.cli.api_key.clone(),
            base_url: self.cli.base_url.clone(),
            ..Default::default()
        };
        ClientSettings::load(self.cli.config.as_deref(), overrides)
    }

    fn connect(&self) -> Result<(ClientSettings, HttpClient)> {
        let settings = self.load_settings()?;
        debug!("Using API root {}", settings.credentials.base_url);
        let client = HttpClient::from_settings(&settings)?;
        Ok((settings, client))
    }

    /// Check connection
    async fn check(&self) -> Result<Vec<JsonValue>> {
        let (settings, client) = self.connect()?;
        info!("Checking connection to {}", settings.credentials.base_url);

        let status = match client.check().await {
            Ok(_) => json!({
                "status": "SUCCEEDED",
                "message": "Connection successful"
            }),
            Err(e) => json!({
                "status": "FAILED",
                "message": format!("Connection failed: {e}")
            }),
        };

        Ok(vec![json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": status
        })])
    }

    async fn get(&self, catalog: &Catalog, resource: &str, id: &str) -> Result<Vec<JsonValue>> {
        let (settings, client) = self.connect()?;
        let record = catalog
            .get_record(&client, settings.pagination, resource, id)
            .await?;
        Ok(vec![Self::record_message(resource, record)])
    }

    async fn list(
        &self,
        catalog: &Catalog,
        resource: &str,
        limit: Option<usize>,
    ) -> Result<Vec<JsonValue>> {
        let (settings, client) = self.connect()?;
        let records = catalog
            .list_records(&client, settings.pagination, resource, limit)
            .await?;
        info!("Fetched {} records from {}", records.len(), resource);
        Ok(records
            .into_iter()
            .map(|record| Self::record_message(resource, JsonValue::Object(record)))
            .collect())
    }

    async fn search(
        &self,
        catalog: &Catalog,
        resource: &str,
        filter: Option<&str>,
    ) -> Result<Vec<JsonValue>> {
        let (settings, client) = self.connect()?;
        let options = catalog
            .search_options(&client, settings.pagination, resource, filter)
            .await?;
        Ok(vec![json!({
            "type": "OPTIONS",
            "resource": resource,
            "options": options
        })])
    }

    async fn upsert(
        &self,
        catalog: &Catalog,
        resource: &str,
        field: &str,
        value: JsonValue,
        data: Option<&str>,
        defaults: Option<&str>,
    ) -> Result<Vec<JsonValue>> {
        let request = catalog
            .upsert_request(resource, field, value)?
            .patch_fields(parse_object("data", data)?)
            .create_defaults(parse_object("defaults", defaults)?);

        let (settings, client) = self.connect()?;
        let outcome = UpsertCoordinator::new(&client)
            .with_settings(settings.pagination)
            .upsert(&request)
            .await?;
        Ok(vec![Self::record_message(resource, outcome.into_json())])
    }

    fn list_resources(catalog: &Catalog) -> JsonValue {
        let mut entries: Vec<JsonValue> = catalog
            .resources
            .iter()
            .map(|r| {
                json!({
                    "name": r.key,
                    "path": r.path,
                    "type": r.resource_type,
                    "direct_get": r.direct_get,
                    "upsert_filter": r.upsert_filter
                })
            })
            .collect();
        entries.extend(catalog.nested.iter().map(|n| {
            json!({
                "name": n.key,
                "parent": n.parent,
                "segment": n.segment,
                "type": n.resource_type,
                "direct_get": false
            })
        }));

        json!({
            "type": "RESOURCES",
            "resources": entries
        })
    }

    fn record_message(resource: &str, record: JsonValue) -> JsonValue {
        json!({
            "type": "RECORD",
            "resource": resource,
            "record": record
        })
    }

    /// Format one output message
    pub fn render(&self, msg: &JsonValue) -> String {
        match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg).unwrap_or_default(),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg).unwrap_or_default(),
        }
    }
}

/// The raw text as a string, or parsed JSON when `as_json` is set
fn parse_match_value(raw: &str, as_json: bool) -> Result<JsonValue> {
    if !as_json {
        return Ok(JsonValue::String(raw.to_string()));
    }
    let value: JsonValue = serde_json::from_str(raw).context("--value is not valid JSON")?;
    Ok(value)
}

fn parse_object(flag: &str, raw: Option<&str>) -> Result<JsonObject> {
    let Some(raw) = raw else {
        return Ok(JsonObject::new());
    };
    let value: JsonValue =
        serde_json::from_str(raw).with_context(|| format!("--{flag} is not valid JSON"))?;
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(Error::config(format!(
            "--{flag} must be a JSON object, got {other}"
        ))),
    }
}
