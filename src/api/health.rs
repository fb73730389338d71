//! Health check endpoint

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Map, Value};

use super::ApiState;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "sofia-chat-widget";

/// Build health router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .with_state(state)
}

/// Health key for a provider name, e.g. `google-tts` -> `google_tts_configured`
#[must_use]
pub fn configured_key(provider: &str) -> String {
    format!("{}_configured", provider.replace('-', "_"))
}

/// Liveness plus speech provider readiness
async fn health(State(state): State<Arc<ApiState>>) -> Json<Value> {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from("healthy"));
    body.insert(
        configured_key(state.speech_provider),
        Value::from(state.speech.is_some()),
    );
    body.insert("service".to_string(), Value::from(SERVICE_NAME));
    body.insert("version".to_string(), Value::from(env!("CARGO_PKG_VERSION")));
    body.insert(
        "profile".to_string(),
        Value::from(state.matcher.profile().id.as_str()),
    );
    Json(Value::Object(body))
}
