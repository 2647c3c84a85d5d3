//! HTTP transport for the query endpoint.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /query?version=N` - body is the base64 query text. Responds 200
//!   with the base64 result text, or an error status with
//!   `{ "condition": ..., "error": ... }`.
//! - `GET /health` - returns `{ "ok": true, "head": N }`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde::Deserialize;
use serde_json::json;

use super::service::{QueryService, Reply};

#[derive(Debug, Default, Deserialize)]
struct VersionParams {
    version: Option<u64>,
}

/// Build an axum `Router` serving queries from the given service.
pub fn router(service: Arc<QueryService>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/query", post(query_handler))
        .with_state(service)
}

/// Serve the endpoint over HTTP at the given address (e.g. `"127.0.0.1:5280"`).
pub async fn serve(service: Arc<QueryService>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=serve module=service status=listening addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await
}

/// `GET /health`
async fn health_handler(State(service): State<Arc<QueryService>>) -> impl IntoResponse {
    match service.store().head() {
        Ok(head) => (StatusCode::OK, Json(json!({ "ok": true, "head": head }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": e.to_string() })),
        ),
    }
}

/// `POST /query`
async fn query_handler(
    State(service): State<Arc<QueryService>>,
    Query(params): Query<VersionParams>,
    body: String,
) -> impl IntoResponse {
    let reply = service.handle(&body, params.version);
    let status = StatusCode::from_u16(reply.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match reply {
        Reply::Result(encoded) => (status, encoded).into_response(),
        Reply::Error { condition, message } => (
            status,
            Json(json!({ "condition": condition, "error": message })),
        )
            .into_response(),
    }
}
