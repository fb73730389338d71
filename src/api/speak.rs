//! Text-to-speech endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;

use super::{ApiError, ApiState};
use crate::Error;
use crate::speech::AudioPayload;

/// Build speech router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/speak", post(speak))
        .with_state(state)
}

/// Synthesis request
#[derive(Debug, Default, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Synthesize text through the configured provider
///
/// Empty text is rejected before the provider is consulted.
async fn speak(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<SpeakRequest>, JsonRejection>,
) -> Result<Json<AudioPayload>, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_else(|rejection| {
        tracing::debug!(error = %rejection, "unreadable speak body");
        SpeakRequest::default()
    });

    let text = match request.text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(Error::InvalidRequest("No text provided").into()),
    };

    let speech = state
        .speech
        .as_ref()
        .ok_or(Error::ProviderUnconfigured(state.speech_provider))?;

    let payload = speech.synthesize(&text).await?;
    tracing::info!(
        provider = speech.name(),
        chars = text.chars().count(),
        "speech synthesized"
    );

    Ok(Json(payload))
}
