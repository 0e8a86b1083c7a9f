//! Tests for the CLI

use super::*;
use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runner_for(server: &MockServer, args: &[&str]) -> Runner {
    let uri = server.uri();
    let mut argv = vec!["axonaut", "--api-key", "test-key", "--base-url", uri.as_str()];
    argv.extend_from_slice(args);
    Runner::new(Cli::parse_from(argv))
}

#[test]
fn test_parse_upsert_args() {
    let cli = Cli::parse_from([
        "axonaut",
        "upsert",
        "company",
        "--field",
        "name",
        "--value",
        "Acme",
        "--data",
        r#"{"siret":"1"}"#,
        "--format",
        "pretty",
    ]);
    assert_eq!(cli.format, OutputFormat::Pretty);
    match cli.command {
        Commands::Upsert {
            resource,
            field,
            value,
            json_value,
            data,
            defaults,
        } => {
            assert_eq!(resource, "company");
            assert_eq!(field, "name");
            assert_eq!(value, "Acme");
            assert!(!json_value);
            assert_eq!(data.as_deref(), Some(r#"{"siret":"1"}"#));
            assert!(defaults.is_none());
        }
        other => panic!("Expected Upsert, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resources_needs_no_credentials() {
    let runner = Runner::new(Cli::parse_from(["axonaut", "resources"]));
    let messages = runner.execute().await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["type"], "RESOURCES");
    let names: Vec<_> = messages[0]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert!(names.contains(&"payslip"));
    assert!(names.contains(&"address"));
}

#[tokio::test]
async fn test_check_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("userApiKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let messages = runner_for(&mock_server, &["check"]).execute().await.unwrap();
    assert_eq!(
        messages,
        vec![json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {"status": "SUCCEEDED", "message": "Connection successful"}
        })]
    );
}

#[tokio::test]
async fn test_check_reports_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&mock_server)
        .await;

    let messages = runner_for(&mock_server, &["check"]).execute().await.unwrap();
    assert_eq!(messages[0]["connectionStatus"]["status"], "FAILED");
    assert!(messages[0]["connectionStatus"]["message"]
        .as_str()
        .unwrap()
        .contains("401"));
}

#[tokio::test]
async fn test_list_with_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "A"},
            {"id": 2, "name": "B"},
            {"id": 3, "name": "C"}
        ])))
        .mount(&mock_server)
        .await;

    let messages = runner_for(&mock_server, &["list", "products", "--limit", "2"])
        .execute()
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["record"]["name"], "B");
}

#[tokio::test]
async fn test_search_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Acme"},
            {"id": 2, "name": "Globex"}
        ])))
        .mount(&mock_server)
        .await;

    let messages = runner_for(&mock_server, &["search", "company", "--filter", "glo"])
        .execute()
        .await
        .unwrap();
    assert_eq!(
        messages[0]["options"],
        json!([{"label": "Globex", "value": "2"}])
    );
}

#[tokio::test]
async fn test_upsert_creates_with_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/companies"))
        .and(body_json(json!({"name": "Acme", "is_prospect": true, "siret": "1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5, "name": "Acme"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let messages = runner_for(
        &mock_server,
        &[
            "upsert",
            "company",
            "--field",
            "name",
            "--value",
            "Acme",
            "--data",
            r#"{"siret":"1"}"#,
            "--defaults",
            r#"{"is_prospect":true}"#,
        ],
    )
    .execute()
    .await
    .unwrap();
    assert_eq!(messages[0]["record"]["operationPerformed"], "created");
}

#[tokio::test]
async fn test_upsert_rejects_bad_data() {
    let mock_server = MockServer::start().await;

    let err = runner_for(
        &mock_server,
        &[
            "upsert", "company", "--field", "name", "--value", "Acme", "--data", "[1]",
        ],
    )
    .execute()
    .await
    .unwrap_err();
    assert!(err.to_string().contains("--data must be a JSON object"));

    let err = runner_for(
        &mock_server,
        &[
            "upsert", "company", "--field", "name", "--value", "Acme", "--data", "{oops",
        ],
    )
    .execute()
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "--data is not valid JSON");
}

#[tokio::test]
async fn test_unknown_resource_fails() {
    let mock_server = MockServer::start().await;

    let err = runner_for(&mock_server, &["get", "spaceships", "1"])
        .execute()
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown resource: spaceships");
}

#[test]
fn test_render_formats() {
    let runner = Runner::new(Cli::parse_from(["axonaut", "resources"]));
    assert_eq!(runner.render(&json!({"a": 1})), r#"{"a":1}"#);

    let runner = Runner::new(Cli::parse_from(["axonaut", "--format", "pretty", "resources"]));
    assert_eq!(runner.render(&json!({"a": 1})), "{\n  \"a\": 1\n}");
}

#[tokio::test]
async fn test_upsert_numeric_looking_value_matches_string_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 8, "name": "Acme Paris", "address_zip_code": "75001"}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/companies/8"))
        .and(body_json(json!({"is_supplier": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 8})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let messages = runner_for(
        &mock_server,
        &[
            "upsert",
            "company",
            "--field",
            "address_zip_code",
            "--value",
            "75001",
            "--data",
            r#"{"is_supplier":true}"#,
        ],
    )
    .execute()
    .await
    .unwrap();
    assert_eq!(messages[0]["record"]["operationPerformed"], "updated");
}

#[tokio::test]
async fn test_upsert_json_value_matches_typed_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "product_code": 1001}
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/products/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let messages = runner_for(
        &mock_server,
        &[
            "upsert",
            "product",
            "--field",
            "product_code",
            "--value",
            "1001",
            "--json-value",
        ],
    )
    .execute()
    .await
    .unwrap();
    assert_eq!(messages[0]["record"]["operationPerformed"], "updated");

    let err = runner_for(
        &mock_server,
        &["upsert", "product", "--field", "product_code", "--value", "{", "--json-value"],
    )
    .execute()
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "--value is not valid JSON");
}
