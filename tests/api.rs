//! API endpoint integration tests

use axum::http::StatusCode;

mod common;
use common::{StubSpeech, build_router, get, post_json};

#[tokio::test]
async fn test_greeting_message() {
    let app = build_router(None);

    let (status, json) = post_json(app, "/api/chat", r#"{"message":"Hola buenos días"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        json["response"]
            .as_str()
            .unwrap()
            .starts_with("¡Hola! Soy Sofia")
    );
    assert_eq!(json["show_materials"], false);
    assert_eq!(json["show_form"], false);
}

#[tokio::test]
async fn test_pricing_question() {
    let app = build_router(None);

    let (status, json) =
        post_json(app, "/api/chat", r#"{"message":"¿Cuánto cuesta el curso?"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        json["response"]
            .as_str()
            .unwrap()
            .starts_with("El curso completo tiene un valor")
    );
    assert_eq!(json["show_materials"], false);
}

#[tokio::test]
async fn test_pricing_with_materials_sets_directive() {
    let app = build_router(None);

    let (status, json) = post_json(
        app,
        "/api/chat",
        r#"{"message":"¿Cuánto cuestan los materiales?"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["response"].as_str().unwrap().starts_with("El curso completo"));
    assert_eq!(json["show_materials"], true);
    assert_eq!(json["show_form"], false);
}

#[tokio::test]
async fn test_empty_message_rejected() {
    for body in [r#"{"message":""}"#, r#"{"message":"   "}"#, "{}", "not json"] {
        let app = build_router(None);
        let (status, json) = post_json(app, "/api/chat", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json, serde_json::json!({"error": "No message provided"}));
    }
}

#[tokio::test]
async fn test_equal_length_unmatched_messages_share_fallback() {
    let (_, first) = post_json(build_router(None), "/api/chat", r#"{"message":"xyz 123"}"#).await;
    let (_, second) = post_json(build_router(None), "/api/chat", r#"{"message":"qwertyu"}"#).await;

    assert_eq!(first["response"], second["response"]);

    let profile = common::academia_matcher();
    let expected = &profile.profile().fallback.replies()[7 % 5];
    assert_eq!(first["response"], expected.as_str());
}

#[tokio::test]
async fn test_legacy_chat_route() {
    let app = build_router(None);

    let (status, json) = post_json(app, "/chat", r#"{"message":"gracias"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sofia"], "¡Con mucho gusto! Si tienes otra pregunta, aquí estaré.");
}

#[tokio::test]
async fn test_speak_blank_text_rejected_before_provider() {
    let stub = StubSpeech::ok();

    for body in [r#"{"text":""}"#, r#"{"text":" \n\t "}"#, "{}", r#"{"texto":"Hola"}"#, "not json"] {
        let app = build_router(Some(stub.clone()));
        let (status, json) = post_json(app, "/api/speak", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json, serde_json::json!({"error": "No text provided"}));
    }

    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_speak_returns_audio() {
    let stub = StubSpeech::ok();
    let app = build_router(Some(stub.clone()));

    let (status, json) = post_json(app, "/api/speak", r#"{"text":"Hola"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["audioContent"], "SUQz");
    assert_eq!(json["audioUrl"], "data:audio/mp3;base64,SUQz");
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_speak_unconfigured() {
    let app = build_router(None);

    let (status, json) = post_json(app, "/api/speak", r#"{"text":"Hola"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_speak_provider_failure() {
    let stub = StubSpeech::failing(429);
    let app = build_router(Some(stub.clone()));

    let (status, json) = post_json(app, "/api/speak", r#"{"text":"Hola"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "stub error 429: quota exceeded");
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(build_router(None), "/api/health").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["google_tts_configured"], false);
    assert_eq!(json["service"], "sofia-chat-widget");
    assert_eq!(json["profile"], "academia");

    let (_, body) = get(build_router(Some(StubSpeech::ok())), "/api/health").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["google_tts_configured"], true);
}

#[tokio::test]
async fn test_index_page_served() {
    let (status, body) = get(build_router(None), "/").await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("/api/chat"));
}

#[tokio::test]
async fn test_static_dir_overrides_embedded_page() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<p>custom widget</p>").unwrap();

    let app = sofia_gateway::api::ApiServerBuilder::new(common::academia_matcher(), 0, "google-tts")
        .static_dir(Some(dir.path().to_path_buf()))
        .build()
        .router();

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "<p>custom widget</p>");
}

#[tokio::test]
async fn test_rate_limit() {
    let app = sofia_gateway::api::ApiServerBuilder::new(common::academia_matcher(), 0, "google-tts")
        .rate_limit(Some(1))
        .build()
        .router();

    let (status, _) = get(app.clone(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(app, "/api/health").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
