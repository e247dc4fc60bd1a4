//! Integration tests for the relay's HTTP surface.
//!
//! These tests drive the full application router with a scripted engine:
//! 1. `/chat-process` framing, identity and failure behavior
//! 2. Capability and liveness endpoints
//! 3. CORS and client disconnects

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use chat_relay::adapters::engine::ScriptedEngine;
use chat_relay::adapters::http::{app_router, AppState};
use chat_relay::application::handlers::{AskHandler, AskHandlerConfig, StreamLimits};
use chat_relay::ports::EngineError;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn app_with(engine: ScriptedEngine, config: AskHandlerConfig) -> Router {
    let engine_timeout = config.engine_timeout;
    app_router(AppState {
        ask_handler: Arc::new(AskHandler::with_config(Arc::new(engine), config)),
        engine_timeout,
        cors_origins: Vec::new(),
    })
}

fn app(engine: ScriptedEngine) -> Router {
    app_with(engine, AskHandlerConfig::default())
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat-process")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn documents(body: &str) -> Vec<Value> {
    body.split('\n')
        .map(|doc| serde_json::from_str(doc).unwrap())
        .collect()
}

// =============================================================================
// /chat-process
// =============================================================================

#[tokio::test]
async fn single_answer_gets_generated_conversation() {
    let engine = ScriptedEngine::new().with_final_chunk("2");

    let response = app(engine.clone())
        .oneshot(chat_request(r#"{"prompt":"2","options":{}}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );

    let body = body_text(response).await;
    assert!(!body.starts_with('\n'));
    let docs = documents(&body);
    assert_eq!(docs.len(), 1);

    let frame = &docs[0];
    assert_eq!(frame["role"], "assistant");
    assert_eq!(frame["text"], "2");
    assert_eq!(frame["detail"]["object"], "chat.completion.chunk");
    assert_eq!(frame["detail"]["model"], "chatgpt");
    assert_eq!(frame["detail"]["choices"][0]["index"], 0);
    assert_eq!(frame["detail"]["choices"][0]["delta"]["content"], "2");
    assert_eq!(frame["detail"]["choices"][0]["finish_reason"], true);

    let conversation_id = frame["conversationId"].as_str().unwrap();
    let parsed = uuid::Uuid::parse_str(conversation_id).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
    assert_eq!(engine.get_calls()[0].conversation_id.as_str(), conversation_id);
}

#[tokio::test]
async fn generated_conversations_differ_between_requests() {
    let engine = ScriptedEngine::new().with_final_chunk("ok");

    let first = body_text(app(engine.clone()).oneshot(chat_request("{}")).await.unwrap()).await;
    let second = body_text(app(engine).oneshot(chat_request("{}")).await.unwrap()).await;

    assert_ne!(
        documents(&first)[0]["conversationId"],
        documents(&second)[0]["conversationId"]
    );
}

#[tokio::test]
async fn supplied_conversation_and_parent_are_kept() {
    let engine = ScriptedEngine::new().with_chunk("hi");

    let body = body_text(
        app(engine.clone())
            .oneshot(chat_request(
                r#"{"prompt":"hello","options":{"conversationId":"conv-42","parentMessageId":"msg-7"}}"#,
            ))
            .await
            .unwrap(),
    )
    .await;

    let frame = &documents(&body)[0];
    assert_eq!(frame["conversationId"], "conv-42");
    assert_eq!(frame["parentMessageId"], "msg-7");
    assert_eq!(frame["detail"]["choices"][0]["finish_reason"], false);

    let calls = engine.get_calls();
    assert_eq!(calls[0].prompt, "hello");
    assert_eq!(calls[0].parent_message_id.as_deref(), Some("msg-7"));
}

#[tokio::test]
async fn system_message_reaches_the_engine() {
    let engine = ScriptedEngine::new();

    app(engine.clone())
        .oneshot(chat_request(r#"{"prompt":"p","systemMessage":"You are terse."}"#))
        .await
        .unwrap();

    assert_eq!(engine.get_calls()[0].system_role_message, "You are terse.");
}

#[tokio::test]
async fn immediate_failure_is_the_whole_body() {
    let engine = ScriptedEngine::new().failing_with(EngineError::rejected("rate limited"));

    let response = app(engine).oneshot(chat_request(r#"{"prompt":"x"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        r#"{"message":"rate limited","data":null,"status":"fail"}"#
    );
}

#[tokio::test]
async fn chunks_then_failure_ends_with_failure_frame() {
    let engine = ScriptedEngine::new()
        .with_chunk("Hel")
        .with_chunk("lo")
        .with_chunk("!")
        .failing_with(EngineError::network("connection reset"));

    let body = body_text(app(engine).oneshot(chat_request(r#"{"prompt":"x"}"#)).await.unwrap()).await;

    let docs = documents(&body);
    assert_eq!(docs.len(), 4);
    assert_eq!(docs[2]["text"], "Hello!");
    assert_eq!(docs[3]["status"], "fail");
    assert_eq!(docs[3]["message"], "network error: connection reset");
    assert!(docs[3]["data"].is_null());
    assert_eq!(body.matches('\n').count(), 3);
}

#[tokio::test]
async fn frame_cap_is_reported_in_band() {
    let config = AskHandlerConfig {
        limits: StreamLimits {
            max_frames: Some(1),
            max_bytes: None,
        },
        ..Default::default()
    };
    let engine = ScriptedEngine::new().with_chunk("a").with_final_chunk("b");

    let body = body_text(
        app_with(engine, config)
            .oneshot(chat_request("{}"))
            .await
            .unwrap(),
    )
    .await;

    let docs = documents(&body);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["message"], "stream budget exceeded: more than 1 frames");
}

#[tokio::test]
async fn empty_body_is_an_empty_request() {
    let engine = ScriptedEngine::new().with_final_chunk("hi");

    let response = app(engine.clone()).oneshot(chat_request("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(engine.get_calls()[0].prompt, "");
}

#[tokio::test]
async fn null_prompt_and_options_reach_the_engine() {
    let engine = ScriptedEngine::new().with_final_chunk("ok");

    let response = app(engine.clone())
        .oneshot(chat_request(r#"{"prompt":null,"options":null}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(engine.call_count(), 1);
    assert_eq!(engine.get_calls()[0].prompt, "");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let engine = ScriptedEngine::new().with_final_chunk("never");

    let response = app(engine.clone())
        .oneshot(chat_request(r#"{"prompt": ["not", "a", "string"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(error["error"].is_string());
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn dropped_response_cancels_the_engine() {
    let engine = ScriptedEngine::new()
        .with_chunk("a")
        .with_delay(Duration::from_millis(300))
        .with_final_chunk("b");

    let response = app(engine.clone()).oneshot(chat_request("{}")).await.unwrap();
    drop(response);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(engine.finished_count(), 0);
}

// =============================================================================
// Capability endpoints
// =============================================================================

async fn json_call(method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app(ScriptedEngine::new())
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, serde_json::from_str(&body_text(response).await).unwrap())
}

#[tokio::test]
async fn config_describes_capabilities() {
    let (status, json) = json_call(Method::POST, "/config").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Success");
    assert_eq!(json["data"]["apiModel"], "ChatGPTAPI");
    assert_eq!(json["data"]["timeoutMs"], 60_000);
    assert_eq!(json["data"]["socksProxy"], "-");
}

#[tokio::test]
async fn ping_session_and_verify() {
    let (status, ping) = json_call(Method::GET, "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ping["message"], "pong");

    let (status, session) = json_call(Method::POST, "/session").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["status"], "Success");
    assert_eq!(session["data"]["auth"], false);

    let (status, verify) = json_call(Method::POST, "/verify").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verify, serde_json::json!({}));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = app(ScriptedEngine::new())
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn preflight_allows_any_origin() {
    let response = app(ScriptedEngine::new())
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/chat-process")
                .header(header::ORIGIN, "http://localhost:1002")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
