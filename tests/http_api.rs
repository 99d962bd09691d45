//! End-to-end tests: the full router on an ephemeral port, driven over
//! HTTP with an in-memory record store.

#![allow(clippy::panic)]

use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{Value, json};

use stream_failure_feed::api;
use stream_failure_feed::app_state::AppState;
use stream_failure_feed::persistence::seed::demo_rows;
use stream_failure_feed::persistence::{InMemoryStore, RecordStore};
use stream_failure_feed::service::{FeedRegistry, FeedService, TracingNotifier};

async fn spawn_server(rows: usize) -> String {
    let store: Arc<dyn RecordStore> =
        Arc::new(InMemoryStore::with_rows(demo_rows(rows, Utc::now())));
    let feed_service = Arc::new(FeedService::new(
        Arc::new(FeedRegistry::new(16)),
        store,
        Arc::new(TracingNotifier),
    ));
    let app = api::build_router().with_state(AppState { feed_service });

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn send(request: reqwest::RequestBuilder) -> (StatusCode, Value) {
    let response = tokio_test::assert_ok!(request.send().await);
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn open_feed(client: &reqwest::Client, base: &str) -> String {
    let (status, body) = send(client.post(format!("{base}/api/v1/feeds")).json(&json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let Some(id) = body["feedId"].as_str() else {
        panic!("missing feedId in {body}");
    };
    id.to_string()
}

#[tokio::test]
async fn feed_pages_until_exhausted() {
    let base = spawn_server(350).await;
    let client = reqwest::Client::new();

    let (status, body) = send(client.post(format!("{base}/api/v1/feeds")).json(&json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "loaded");
    assert_eq!(body["entities"].as_array().map(Vec::len), Some(200));
    let Some(id) = body["feedId"].as_str() else {
        panic!("missing feedId");
    };

    let more = format!("{base}/api/v1/feeds/{id}/more");
    let (status, body) = send(client.post(&more)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "applied");
    assert_eq!(body["outcome"]["received"], 150);
    assert_eq!(body["feed"]["status"], "exhausted");
    assert_eq!(body["feed"]["hasMore"], false);

    let (_, body) = send(client.post(&more)).await;
    assert_eq!(body["outcome"]["kind"], "skipped");
}

#[tokio::test]
async fn filters_and_sort_reload_the_feed() {
    let base = spawn_server(120).await;
    let client = reqwest::Client::new();
    let id = open_feed(&client, &base).await;

    let (status, body) = send(
        client
            .put(format!("{base}/api/v1/feeds/{id}/filters"))
            .json(&json!({ "orgIds": ["org-001"], "id": "FAILURE-0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feed"]["activeFilterCount"], 2);
    let Some(entities) = body["feed"]["entities"].as_array() else {
        panic!("missing entities");
    };
    assert!(!entities.is_empty());
    assert!(entities.iter().all(|e| e["orgId"] == "org-001"));

    let (status, body) = send(
        client
            .post(format!("{base}/api/v1/feeds/{id}/sort"))
            .json(&json!({ "field": "failurePayload" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1002);

    let (status, body) = send(
        client
            .post(format!("{base}/api/v1/feeds/{id}/sort"))
            .json(&json!({ "field": "createdDate" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feed"]["sort"], json!({ "field": "createdDate", "direction": "asc" }));

    let (status, body) = send(client.delete(format!("{base}/api/v1/feeds/{id}/filters"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feed"]["activeFilterCount"], 0);
    assert_eq!(body["feed"]["entities"].as_array().map(Vec::len), Some(120));
}

#[tokio::test]
async fn created_failure_is_listed_and_inspectable() {
    let base = spawn_server(10).await;
    let client = reqwest::Client::new();
    let id = open_feed(&client, &base).await;

    let (status, created) = send(
        client
            .post(format!("{base}/api/v1/feeds/{id}/failures"))
            .json(&json!({
                "orgId": "org-005",
                "failureStatus": "PENDING",
                "failurePayload": "not json"
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["failurePayload"], json!({ "message": "not json" }));
    let Some(failure_id) = created["id"].as_str() else {
        panic!("missing failure id");
    };

    let (_, feed) = send(client.get(format!("{base}/api/v1/feeds/{id}"))).await;
    assert_eq!(feed["entities"][0]["id"], failure_id);
    assert_eq!(feed["entities"].as_array().map(Vec::len), Some(11));

    let (status, detail) = send(client.get(format!(
        "{base}/api/v1/feeds/{id}/failures/{failure_id}"
    )))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["ended"], "Not completed");
    assert_eq!(detail["presentation"]["tone"], "warning");

    let (status, body) = send(client.post(format!("{base}/api/v1/feeds/{id}/failures")).json(
        &json!({ "orgId": "", "failureStatus": "PENDING" }),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn closed_feed_returns_not_found() {
    let base = spawn_server(5).await;
    let client = reqwest::Client::new();
    let id = open_feed(&client, &base).await;

    let (status, _) = send(client.delete(format!("{base}/api/v1/feeds/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(client.get(format!("{base}/api/v1/feeds/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn system_routes_answer() {
    let base = spawn_server(0).await;
    let client = reqwest::Client::new();

    let (status, health) = send(client.get(format!("{base}/health"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["openFeeds"], 0);

    let (_, statuses) = send(client.get(format!("{base}/config/failure-statuses"))).await;
    assert_eq!(statuses.as_array().map(Vec::len), Some(5));
    assert_eq!(statuses[0]["value"], "PENDING");

    let (_, orgs) = send(client.get(format!("{base}/config/org-ids"))).await;
    assert_eq!(orgs, json!(["org-001", "org-002", "org-003", "org-004", "org-005"]));
}
