//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sofia_gateway::api::ApiServerBuilder;
use sofia_gateway::speech::SharedSpeech;
use sofia_gateway::{AudioPayload, Error, IntentMatcher, Result, RoutingProfile, SpeechProvider};
use tower::ServiceExt;

/// Matcher over the embedded academy profile
#[must_use]
pub fn academia_matcher() -> IntentMatcher {
    IntentMatcher::new(RoutingProfile::embedded("academia").expect("embedded profile"))
}

/// Build the full API router around the academy profile
pub fn build_router(speech: Option<SharedSpeech>) -> Router {
    ApiServerBuilder::new(academia_matcher(), 0, "google-tts")
        .speech(speech)
        .build()
        .router()
}

/// POST a JSON body and return status plus parsed response
pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// GET and return status plus raw body
pub async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// Speech provider that records calls and returns a fixed outcome
pub struct StubSpeech {
    pub calls: AtomicUsize,
    pub fail_with_status: Option<u16>,
}

impl StubSpeech {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with_status: None,
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail_with_status: Some(status),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechProvider for StubSpeech {
    async fn synthesize(&self, _text: &str) -> Result<AudioPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with_status {
            Some(status) => Err(Error::ProviderFailure {
                provider: "stub",
                status: Some(status),
                message: "quota exceeded".to_string(),
            }),
            None => Ok(AudioPayload::from_bytes(
                b"ID3",
                sofia_gateway::speech::AudioEncoding::Mp3,
            )),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
