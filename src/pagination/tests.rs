//! Tests for pagination module

use super::*;
use crate::config::PaginationSettings;
use crate::http::{EndpointDescriptor, HttpClient, HttpClientConfig};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use wiremock::matchers::{header, header_exists, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .header("userApiKey", "test-key")
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

/// `count` records with ids starting at `first_id`
fn records(first_id: u64, count: u64) -> Value {
    Value::Array(
        (first_id..first_id + count)
            .map(|id| json!({"id": id, "name": format!("Company {id}")}))
            .collect(),
    )
}

fn ids(records: &[crate::types::Record]) -> Vec<u64> {
    records
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect()
}

// ============================================================================
// PageResult Tests
// ============================================================================

#[test]
fn test_page_result_full_array_continues() {
    let page = PageResult::from_response(records(1, 3), 3);
    assert_eq!(page.len(), 3);
    assert!(!page.is_terminal);
}

#[test_case(0 ; "empty page")]
#[test_case(2 ; "short page")]
fn test_page_result_short_array_is_terminal(count: u64) {
    let page = PageResult::from_response(records(1, count), 3);
    assert_eq!(page.len(), count as usize);
    assert!(page.is_terminal);
}

#[test]
fn test_page_result_data_envelope() {
    let page = PageResult::from_response(json!({"data": records(1, 2), "total": 2}), 2);
    assert_eq!(ids(&page.records), vec![1, 2]);
    assert!(!page.is_terminal);
}

#[test]
fn test_page_result_single_object_is_one_terminal_record() {
    let page = PageResult::from_response(json!({"id": 7, "name": "Solo"}), 1);
    assert_eq!(page.len(), 1);
    assert_eq!(page.records[0]["name"], "Solo");
    assert!(page.is_terminal);
}

#[test]
fn test_page_result_object_with_non_array_data_is_a_record() {
    let page = PageResult::from_response(json!({"id": 1, "data": "x"}), 100);
    assert_eq!(page.len(), 1);
    assert_eq!(page.records[0]["data"], "x");
}

#[test]
fn test_page_result_null_is_empty() {
    let page = PageResult::from_response(Value::Null, 100);
    assert!(page.is_empty());
    assert!(page.is_terminal);
}

#[test]
fn test_strategy_apply() {
    let base = EndpointDescriptor::get("/companies").query("type", "customer");

    let by_header = PaginationStrategy::Header.apply(&base, 2, 50);
    assert_eq!(by_header.headers.get("page"), Some(&"2".to_string()));
    assert_eq!(by_header.headers.get("per_page"), Some(&"50".to_string()));
    assert!(!by_header.query.contains_key("page"));

    let by_query = PaginationStrategy::Query.apply(&base, 2, 50);
    assert_eq!(by_query.query["page"], 2);
    assert_eq!(by_query.query["per_page"], 50);
    assert_eq!(by_query.query["type"], "customer");
    assert!(by_query.headers.is_empty());
}

#[test]
fn test_aggregation_state() {
    let mut state = AggregationState::new(25);
    assert_eq!(state.page, 1);
    assert_eq!(state.strategy, PaginationStrategy::Header);

    state.push_page(PageResult::from_response(records(1, 2), 25));
    state.next_page();
    state.fall_back_to_query();

    assert_eq!(state.page, 2);
    assert_eq!(state.strategy, PaginationStrategy::Query);
    assert_eq!(ids(&state.into_records()), vec![1, 2]);
}

// ============================================================================
// Aggregator Tests
// ============================================================================

#[tokio::test]
async fn test_collect_all_stops_on_short_page() {
    let mock_server = MockServer::start().await;

    for (page, first_id, count) in [(1, 1, 3), (2, 4, 3), (3, 7, 3), (4, 10, 1)] {
        Mock::given(method("GET"))
            .and(path("/companies"))
            .and(header("page", page.to_string().as_str()))
            .and(header("per_page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(records(first_id, count)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    let descriptor = EndpointDescriptor::get("/companies").query("limit", 3);
    let result = Aggregator::new(&client)
        .collect_all(&descriptor)
        .await
        .unwrap();

    assert_eq!(result.len(), 10);
    assert_eq!(ids(&result), (1..=10).collect::<Vec<_>>());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_collect_all_stops_at_page_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 2)))
        .expect(50)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let descriptor = EndpointDescriptor::get("/products").query("limit", 2);
    let result = Aggregator::new(&client)
        .collect_all(&descriptor)
        .await
        .unwrap();

    assert_eq!(result.len(), 100);
}

#[tokio::test]
async fn test_collect_all_respects_configured_page_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 5)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = Aggregator::new(&client)
        .with_settings(PaginationSettings {
            default_per_page: 5,
            max_pages: 3,
        })
        .collect_all(&EndpointDescriptor::get("/products"))
        .await
        .unwrap();

    assert_eq!(result.len(), 15);
}

#[tokio::test]
async fn test_collect_all_falls_back_to_query_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/invoices"))
        .and(header_exists("page"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown header"))
        .expect(1)
        .mount(&mock_server)
        .await;

    for (page, first_id, count) in [(1, 1, 2), (2, 3, 2), (3, 5, 1)] {
        Mock::given(method("GET"))
            .and(path("/invoices"))
            .and(query_param("page", page.to_string().as_str()))
            .and(query_param("per_page", "2"))
            .and(query_param_is_missing("limit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(records(first_id, count)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    let descriptor = EndpointDescriptor::get("/invoices").query("limit", "2");
    let result = Aggregator::new(&client)
        .collect_all(&descriptor)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_collect_all_switches_mid_call_without_refetching() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 2)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(3, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let descriptor = EndpointDescriptor::get("/tasks").query("limit", 2);
    let result = Aggregator::new(&client)
        .collect_all(&descriptor)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_collect_all_unpaged_fallback_is_whole_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payslips"))
        .and(header_exists("page"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payslips"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/payslips"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 7)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = Aggregator::new(&client)
        .collect_all(&EndpointDescriptor::get("/payslips").query("limit", 3))
        .await
        .unwrap();

    assert_eq!(result.len(), 7);
}

#[tokio::test]
async fn test_collect_all_unpaged_fallback_replaces_earlier_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pipes"))
        .and(header("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 2)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pipes"))
        .and(header("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pipes"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pipes"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 3)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = Aggregator::new(&client)
        .collect_all(&EndpointDescriptor::get("/pipes").query("limit", 2))
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_collect_all_surfaces_final_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/expenses"))
        .and(header_exists("page"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/expenses"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/expenses"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = Aggregator::new(&client)
        .collect_all(&EndpointDescriptor::get("/expenses"))
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), Some(503));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_collect_all_default_page_size_and_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/quotations"))
        .and(header("per_page", "100"))
        .and(query_param("status", "pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": records(1, 4)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let descriptor = EndpointDescriptor::get("/quotations").query("status", "pending");
    let result = Aggregator::new(&client)
        .collect_all(&descriptor)
        .await
        .unwrap();

    assert_eq!(result.len(), 4);
}

#[tokio::test]
async fn test_collect_limited_truncates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 8)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let aggregator = Aggregator::new(&client);
    let descriptor = EndpointDescriptor::get("/events");

    let limited = aggregator
        .collect_limited(&descriptor, Some(5))
        .await
        .unwrap();
    assert_eq!(ids(&limited), vec![1, 2, 3, 4, 5]);

    let unlimited = aggregator.collect_limited(&descriptor, None).await.unwrap();
    assert_eq!(unlimited.len(), 8);
}

#[tokio::test]
async fn test_unpaged_fallback_is_plain_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/invoices/search"))
        .and(query_param("status", "paid"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records(1, 3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let descriptor = EndpointDescriptor::post(
        "/invoices/search",
        serde_json::from_value(json!({"status": "paid"})).unwrap(),
    )
    .query("status", "paid");

    let result = Aggregator::new(&client)
        .collect_all(&descriptor)
        .await
        .unwrap();
    assert_eq!(ids(&result), vec![1, 2, 3]);

    let requests = mock_server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.method.to_string(), "GET");
    assert!(last.body.is_empty());
}
