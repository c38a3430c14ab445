pub mod state;

pub use state::ApiState;

use crate::common::model::RawContent;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use base64::Engine;
use serde_json::json;
use std::collections::HashMap;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/content", get(content))
        .route("/update", post(update))
        .route("/subscribers", get(list_subscribers).post(register_subscribers))
        .route("/subscribers/:name", delete(remove_subscriber))
        .route("/deliveries", get(deliveries))
        .with_state(state)
}

/// Read endpoint: last computed structured content.
async fn content(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let content = state.pipeline.content().await;
    Json(json!({ "content": content.into_value() }))
}

/// Push variant of the content source: an inbound body (base64 or plain)
/// triggers an update cycle immediately.
async fn update(State(state): State<ApiState>, body: axum::body::Bytes) -> StatusCode {
    let raw = decode_body(&body);
    state.pipeline.update(raw).await;
    StatusCode::OK
}

fn decode_body(body: &[u8]) -> RawContent {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(trimmed) {
        if let Ok(decoded) = String::from_utf8(decoded) {
            return RawContent::new(decoded);
        }
    }
    RawContent::new(trimmed)
}

async fn list_subscribers(
    State(state): State<ApiState>,
) -> Json<HashMap<String, String>> {
    Json(state.notifier.subscribers().await)
}

/// Accepts `{"name": "endpoint", ...}` pairs; each is registered and
/// persisted before the call returns.
async fn register_subscribers(
    State(state): State<ApiState>,
    Json(pairs): Json<HashMap<String, String>>,
) -> Result<StatusCode, (StatusCode, String)> {
    for (name, endpoint) in &pairs {
        state
            .notifier
            .register(name, endpoint)
            .await
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    }
    Ok(StatusCode::CREATED)
}

async fn remove_subscriber(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .notifier
        .remove(&name)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Observability: per-subscriber outcomes of the most recent broadcast.
async fn deliveries(
    State(state): State<ApiState>,
) -> Json<Vec<crate::common::model::DeliveryAttempt>> {
    Json(state.notifier.last_attempts().await)
}
