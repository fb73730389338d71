//! Chat endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::Error;
use crate::intent::{Reply, Selection};

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/chat", post(legacy_chat))
        .with_state(state)
}

/// Chat request body
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Chat response: the reply plus one boolean per profile directive
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(flatten)]
    pub directives: serde_json::Map<String, serde_json::Value>,
}

impl From<Reply> for ChatResponse {
    fn from(reply: Reply) -> Self {
        let directives = reply
            .directives
            .into_iter()
            .map(|flag| (flag.name, serde_json::Value::Bool(flag.active)))
            .collect();
        Self {
            response: reply.text,
            directives,
        }
    }
}

/// Response shape of the original widget endpoint
#[derive(Debug, Serialize)]
pub struct LegacyChatResponse {
    pub sofia: String,
}

/// Pull a non-blank message out of the request, or reject it
fn message_from(body: Result<Json<ChatRequest>, JsonRejection>) -> Result<String, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable chat body");
            ChatRequest::default()
        }
    };

    match request.message {
        Some(message) if !message.trim().is_empty() => Ok(message),
        _ => Err(Error::InvalidRequest("No message provided").into()),
    }
}

fn reply_to(state: &ApiState, message: &str) -> Result<Reply, ApiError> {
    let reply = state.matcher.respond(message)?;
    match &reply.selection {
        Selection::Route(route) => tracing::info!(route = %route, "chat reply"),
        Selection::Fallback(index) => tracing::info!(fallback = index, "chat reply"),
    }
    Ok(reply)
}

/// Answer a chat message
async fn chat(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = message_from(body)?;
    let reply = reply_to(&state, &message)?;
    Ok(Json(reply.into()))
}

/// Answer a chat message in the original `{"sofia": ...}` shape
async fn legacy_chat(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<LegacyChatResponse>, ApiError> {
    let message = message_from(body)?;
    let reply = reply_to(&state, &message)?;
    Ok(Json(LegacyChatResponse { sofia: reply.text }))
}
