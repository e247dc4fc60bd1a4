//! HTTP routes for the chat endpoint.

use axum::{routing::post, Router};

use super::handlers::{chat_process, ChatAppState};

/// Creates the chat router.
pub fn chat_router(state: ChatAppState) -> Router {
    Router::new()
        .route("/chat-process", post(chat_process))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::engine::ScriptedEngine;
    use crate::application::handlers::AskHandler;
    use crate::ports::EngineError;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(engine: ScriptedEngine) -> Router {
        let handler = Arc::new(AskHandler::new(Arc::new(engine)));
        chat_router(ChatAppState::new(handler))
    }

    fn post_chat(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat-process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn streams_frames_as_octet_stream() {
        let app = router(ScriptedEngine::new().with_chunk("Hel").with_final_chunk("lo"));

        let response = app
            .oneshot(post_chat(r#"{"prompt":"hi","options":{"conversationId":"c-9"}}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );

        let text = body_text(response).await;
        let docs: Vec<serde_json::Value> = text
            .split('\n')
            .map(|d| serde_json::from_str(d).unwrap())
            .collect();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["text"], "Hello");
        assert_eq!(docs[1]["conversationId"], "c-9");
        assert_eq!(docs[1]["detail"]["model"], "chatgpt");
    }

    #[tokio::test]
    async fn engine_failure_is_in_band() {
        let app = router(ScriptedEngine::new().failing_with(EngineError::rejected("rate limited")));

        let response = app.oneshot(post_chat(r#"{"prompt":"x"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            r#"{"message":"rate limited","data":null,"status":"fail"}"#
        );
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_before_streaming() {
        let engine = ScriptedEngine::new().with_final_chunk("never");
        let app = router(engine.clone());

        let response = app.oneshot(post_chat("{oops")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(error["error"].as_str().unwrap().starts_with("invalid request body:"));
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn get_is_not_allowed() {
        let app = router(ScriptedEngine::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/chat-process")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
