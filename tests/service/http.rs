//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use mdb::service::{self, decode_result, encode_query};

use crate::support::demo_service;

/// Bind to port 0 and return the actual address.
async fn start_server(service: Arc<mdb::QueryService>) -> String {
    let app = service::router(service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_reports_head() {
    let (_dir, service) = demo_service();
    let head = service.store().head().unwrap();
    let base = start_server(Arc::new(service)).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["head"], head);
}

#[tokio::test]
async fn query_returns_base64_json() {
    let (_dir, service) = demo_service();
    let base = start_server(Arc::new(service)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/query"))
        .body(encode_query("//Page"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let text = resp.text().await.unwrap();
    let items: Vec<serde_json::Value> =
        serde_json::from_str(&decode_result(&text).unwrap()).unwrap();
    let keys: Vec<&str> = items.iter().map(|i| i["key"].as_str().unwrap()).collect();
    assert_eq!(keys, ["/about", "/news/today"]);
}

#[tokio::test]
async fn query_at_version() {
    let (_dir, service) = demo_service();
    let base = start_server(Arc::new(service)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/query?version=1"))
        .body(encode_query("*"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let text = resp.text().await.unwrap();
    let items: Vec<serde_json::Value> =
        serde_json::from_str(&decode_result(&text).unwrap()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["key"], "root");
}

#[tokio::test]
async fn errors_carry_condition() {
    let (_dir, service) = demo_service();
    let base = start_server(Arc::new(service)).await;
    let client = reqwest::Client::new();

    let cases = [
        ("", "news[", "undefined-condition"),
        ("?version=999", "*", "item-not-found"),
    ];
    for (params, query, condition) in cases {
        let resp = client
            .post(format!("{base}/query{params}"))
            .body(encode_query(query))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["condition"], condition);
        assert!(body["error"].as_str().is_some());
    }

    let resp = client
        .post(format!("{base}/query"))
        .body("%%% not base64")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["condition"], "bad-request");
}
