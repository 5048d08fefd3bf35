//! Indexer behavior against a mocked search cluster
//!
//! No database is attached to these requests, so every FIPS code fails at
//! its first address page. That is enough to drive index resolution, alias
//! handling and status bookkeeping end to end.

mod common;

use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use datapipe::config::{IndexConfig, SearchConfig};
use datapipe::request::Request;
use datapipe::search::indexer::bulk_index;
use datapipe::search::{AddressDocument, IndexOptions, Indexer, RetryPolicy, SearchClient, FIPS_STATUS_INDEX};

const SEARCH_KEY: &str = "search";
const ALIAS: &str = "addresses";

fn client(server: &MockServer) -> SearchClient {
    SearchClient::new(&SearchConfig {
        url: server.uri(),
        username: None,
        password: None,
        timeout_secs: 5,
    })
    .unwrap()
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base: Duration::from_millis(1),
        cap: Duration::from_millis(5),
    }
}

fn address(id: &str) -> AddressDocument {
    AddressDocument {
        am_id: id.to_string(),
        am_updated_at: Utc::now(),
        property_id: None,
        ad_attom_id: Some(1),
        fa_property_id: None,
        full_address: Some("1 MAIN ST".into()),
        fips: "06037".into(),
        state: Some("CA".into()),
        state_full_name: Some("California".into()),
        county: None,
        zip5: "90012".into(),
        pre_directional: None,
        street_number: Some("1".into()),
        street: Some("Main".into()),
        post_directional: None,
        street_type: Some("St".into()),
        unit_type: None,
        unit_nbr: None,
        city: Some("Los Angeles".into()),
        source: None,
        location: None,
    }
}

fn indexer(server: &MockServer) -> Indexer {
    let request = Request::builder().search(SEARCH_KEY, client(server)).build();
    let config = IndexConfig {
        alias: ALIAS.to_string(),
        fips: Some("06037".to_string()),
        ..IndexConfig::default()
    };
    let mut options = IndexOptions::from(&config);
    options.retry = fast_retry(2);
    Indexer::new(request, common::TEST_POOL_KEY, SEARCH_KEY, options)
}

async fn status_documents(server: &MockServer) -> Vec<Value> {
    let status_path = format!("/{}/_doc/06037", FIPS_STATUS_INDEX);
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PUT" && r.url.path() == status_path)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_bulk_index_sends_ndjson() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errors": false, "items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::builder().build();
    let docs = vec![address("a"), address("b")];
    let indexed = bulk_index(&client(&server), &request, "addresses_1", &docs, fast_retry(3))
        .await
        .unwrap();
    assert_eq!(indexed, 2);

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8(received[0].body.clone()).unwrap();
    let lines: Vec<Value> = body.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["index"]["_id"], "a");
    assert_eq!(lines[0]["index"]["_index"], "addresses_1");
    assert_eq!(lines[3]["am_id"], "b");
}

#[tokio::test]
async fn test_bulk_index_retries_rate_limits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": true,
            "items": [{"index": {"_id": "a", "status": 429, "error": {"type": "es_rejected_execution_exception"}}}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errors": false, "items": []})))
        .mount(&server)
        .await;

    let request = Request::builder().build();
    let indexed = bulk_index(&client(&server), &request, "addresses_1", &[address("a")], fast_retry(5))
        .await
        .unwrap();
    assert_eq!(indexed, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_bulk_index_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let request = Request::builder().build();
    let err = bulk_index(&client(&server), &request, "addresses_1", &[address("a")], fast_retry(3))
        .await
        .unwrap_err();
    assert_eq!(err.meta["attempts"], 3);
}

#[tokio::test]
async fn test_bulk_index_item_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": true,
            "items": [
                {"index": {"_id": "a", "status": 201}},
                {"index": {"_id": "b", "status": 400, "error": {"type": "mapper_parsing_exception"}}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = Request::builder().build();
    let err = bulk_index(
        &client(&server),
        &request,
        "addresses_1",
        &[address("a"), address("b")],
        fast_retry(3),
    )
    .await
    .unwrap_err();
    assert_eq!(err.meta["failed"], 1);
    assert_eq!(err.meta["first_error"]["type"], "mapper_parsing_exception");
}

#[tokio::test]
async fn test_bulk_index_canceled() {
    let server = MockServer::start().await;
    let request = Request::builder().build();
    request.cancel_token().cancel();

    let err = bulk_index(&client(&server), &request, "addresses_1", &[address("a")], fast_retry(3))
        .await
        .unwrap_err();
    assert!(err.is(datapipe_common::Code::Canceled));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_run_creates_index_and_alias() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_alias/addresses"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "alias [addresses] missing"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/addresses_\d{8}_\d{6}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/fips_processing_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/fips_processing_status/_doc/06037"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_aliases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_cat/indices/addresses_*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"index": "addresses_20240101_000000"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/addresses_20240101_000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;

    let summary = indexer(&server).run().await.unwrap();

    assert!(summary.created);
    assert!(summary.index.starts_with("addresses_"));
    assert_eq!(summary.fips_total, 1);
    assert_eq!(summary.fips_failed, 1);
    assert_eq!(summary.documents, 0);

    let statuses = status_documents(&server).await;
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0]["processed"], false);
    assert_eq!(statuses[1]["processed"], true);
    assert_eq!(statuses[1]["count"], 0);
    assert!(statuses[1]["error"].as_str().unwrap().contains("Unknown database pool"));
}

#[tokio::test]
async fn test_current_mapping_reuses_index() {
    let server = MockServer::start().await;
    let existing = "addresses_20250101_000000";

    Mock::given(method("GET"))
        .and(path("/_alias/addresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ existing: {"aliases": {"addresses": {}}} })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/_mapping", existing)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            existing: {"mappings": AddressDocument::index_body()["mappings"].clone()}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/fips_processing_status"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"type": "resource_already_exists_exception"},
            "status": 400
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/fips_processing_status/_doc/06037"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "updated"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/addresses_\d{8}_\d{6}$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_aliases"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let summary = indexer(&server).run().await.unwrap();

    assert!(!summary.created);
    assert_eq!(summary.index, existing);
    assert_eq!(summary.fips_failed, 1);
}

#[tokio::test]
async fn test_changed_mapping_creates_new_index() {
    let server = MockServer::start().await;
    let existing = "addresses_20250101_000000";

    Mock::given(method("GET"))
        .and(path("/_alias/addresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ existing: {"aliases": {"addresses": {}}} })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{}/_mapping", existing)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            existing: {"mappings": {"dynamic": "strict", "properties": {"am_id": {"type": "text"}}}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/addresses_\d{8}_\d{6}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/fips_processing_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_cat/indices/addresses_*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"index": existing}])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/{}", existing)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_aliases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;

    let summary = indexer(&server).run().await.unwrap();
    assert!(summary.created);
    assert_ne!(summary.index, existing);

    let received = server.received_requests().await.unwrap();
    let alias_update = received
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/_aliases")
        .unwrap();
    let actions: Value = serde_json::from_slice(&alias_update.body).unwrap();
    assert_eq!(actions["actions"][0]["remove"]["index"], existing);
    assert_eq!(actions["actions"][1]["add"]["index"], summary.index.as_str());
}

#[tokio::test]
async fn test_unreachable_alias_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/_alias/addresses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = indexer(&server).run().await.unwrap_err();
    assert!(err.cause.as_deref().unwrap().contains("500"));
}
