//! Axum router configuration with middleware.
//!
//! All memory routes are under `/api/`; `GET /health` sits at the root.
//! Middleware: permissive CORS, request tracing. Snapshot uploads are not
//! size-capped.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Memory namespaces
        .route("/export-memory", post(handlers::memory::export_memory))
        .route(
            "/import-memory",
            post(handlers::memory::import_memory).layer(DefaultBodyLimit::disable()),
        )
        .route("/del-memory", post(handlers::memory::delete_memory))
        // Chat
        .route("/chat", post(handlers::chat::chat))
        .route("/chatV2", post(handlers::chat::chat_v2))
        // Episodic memory
        .route(
            "/save_episodic_memory",
            post(handlers::episodic::save_episodic_memory),
        )
        .route(
            "/del_episodic_memory",
            delete(handlers::episodic::delete_episodic_memory),
        )
        // Share pages
        .route("/chatgpt-share", post(handlers::share::extract_share));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use memorb_core::llm::box_provider::BoxLlmProvider;
    use memorb_core::memory::box_embedder::BoxEmbedder;
    use memorb_core::memory::box_vector::BoxVectorStore;
    use memorb_core::scrape::{BoxConversationScraper, ConversationScraper, ScraperSet};
    use memorb_core::testing::{HashEmbedder, InMemoryVectorStore, ScriptedLlm};
    use memorb_types::config::Settings;
    use memorb_types::error::ScrapeError;
    use memorb_types::llm::{Message, MessageRole};
    use memorb_types::scrape::{ConversationTurn, ScrapeStrategy};
    use memorb_types::tenant::TenantId;

    use super::*;

    /// Scraper answering every URL the same way.
    struct CannedScraper {
        strategy: ScrapeStrategy,
        fail: bool,
    }

    impl ConversationScraper for CannedScraper {
        fn strategy(&self) -> ScrapeStrategy {
            self.strategy
        }

        async fn scrape(&self, _url: &str) -> Result<Vec<ConversationTurn>, ScrapeError> {
            if self.fail {
                return Err(ScrapeError::InsufficientMessages { found: 1 });
            }
            Ok(vec![
                Message::user("How do I regrout tile?"),
                Message::assistant(format!("Answered by {}", self.strategy)),
            ])
        }
    }

    fn scrapers(fail_raw: bool) -> ScraperSet {
        ScraperSet::new(
            BoxConversationScraper::new(CannedScraper {
                strategy: ScrapeStrategy::Rendered,
                fail: false,
            }),
            BoxConversationScraper::new(CannedScraper {
                strategy: ScrapeStrategy::RawHtml,
                fail: fail_raw,
            }),
            ScrapeStrategy::Rendered,
        )
    }

    fn state_with(llm: ScriptedLlm, store: InMemoryVectorStore) -> AppState {
        let mut settings = Settings::default();
        settings.memory.vector_store.embedding_model_dims = 8;
        AppState::from_parts(
            &settings,
            Arc::new(BoxLlmProvider::new(llm)),
            Arc::new(BoxVectorStore::new(store)),
            Arc::new(BoxEmbedder::new(HashEmbedder::new(8))),
            scrapers(true),
        )
    }

    fn state() -> AppState {
        state_with(ScriptedLlm::replying("Sure."), InMemoryVectorStore::new())
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(state, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Parse `data:` frames of an SSE body into JSON values.
    fn sse_frames(body: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(body)
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|data| serde_json::from_str(data.trim()).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_del_memory_requires_user_id() {
        let request = json_request(Method::POST, "/api/del-memory", json!({}));
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "user_id is required"}));
    }

    #[tokio::test]
    async fn test_del_memory_success_and_downstream_failure() {
        let request = json_request(Method::POST, "/api/del-memory", json!({"user_id": "alice"}));
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Memory for user alice deleted"}));

        let broken = state_with(
            ScriptedLlm::replying("unused"),
            InMemoryVectorStore::unreachable("refused"),
        );
        let request = json_request(Method::POST, "/api/del-memory", json!({"user_id": "alice"}));
        let (status, body) = send_json(broken, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to delete memory for user alice"}));
    }

    #[tokio::test]
    async fn test_export_defaults_user_and_returns_attachment() {
        let store = InMemoryVectorStore::new();
        let state = state_with(ScriptedLlm::replying("unused"), store.clone());
        state.memory.provision(&TenantId::new("default_user")).await.unwrap();

        let request = Request::post("/api/export-memory").body(Body::empty()).unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"memory_orb_default_user.snapshot\""
        );
    }

    #[tokio::test]
    async fn test_export_failure_is_500() {
        let request = json_request(Method::POST, "/api/export-memory", json!({"user_id": "ghost"}));
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Snapshot export failed"}));
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let boundary = "memorbboundary";
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{boundary}\r\n"));
            match file_name {
                Some(file) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        Request::post("/api/import-memory")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_import_validation_and_success() {
        let request = multipart_request(&[("user_id", None, "alice")]);
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Uploaded file not found"}));

        let request = multipart_request(&[("snapshot", Some(""), "[]")]);
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file selected"}));

        let store = InMemoryVectorStore::new();
        let state = state_with(ScriptedLlm::replying("unused"), store.clone());
        let request = multipart_request(&[
            ("user_id", None, "alice"),
            ("snapshot", Some("alice.snapshot"), "[]"),
        ]);
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Memory snapshot imported successfully"}));
        assert!(store.contains("memory_orb_alice"));

        let request = multipart_request(&[("snapshot", Some("bad.snapshot"), "not json")]);
        let (status, body) = send_json(state_with(ScriptedLlm::replying("x"), store), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Memory snapshot import failed"}));
    }

    #[tokio::test]
    async fn test_import_accepts_snapshot_over_default_body_limit() {
        let snapshot = format!("[{}]", " ".repeat(3 * 1024 * 1024));
        let store = InMemoryVectorStore::new();
        let state = state_with(ScriptedLlm::replying("unused"), store.clone());
        let request = multipart_request(&[
            ("user_id", None, "alice"),
            ("snapshot", Some("alice.snapshot"), snapshot.as_str()),
        ]);

        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Memory snapshot imported successfully"}));
        assert!(store.contains("memory_orb_alice"));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        for body in [json!({"user_id": "alice"}), json!({"message": "  "})] {
            let request = json_request(Method::POST, "/api/chat", body);
            let (status, body) = send_json(state(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({"error": "Message cannot be empty"}));
        }
    }

    #[tokio::test]
    async fn test_chat_streams_fragments_then_done() {
        let llm = ScriptedLlm::replying(r#"{"facts": []}"#).then_reply("Hello there");
        let state = state_with(llm, InMemoryVectorStore::new());

        let request = json_request(
            Method::POST,
            "/api/chat",
            json!({"message": "hi", "user_id": "alice"}),
        );
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-accel-buffering"], "no");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            sse_frames(&body),
            vec![
                json!({"content": "Hello "}),
                json!({"content": "there"}),
                json!({"done": true}),
            ]
        );
    }

    #[tokio::test]
    async fn test_chat_v2_single_content_event() {
        let request = json_request(
            Method::POST,
            "/api/chatV2",
            json!({"message": "hi", "user_id": "alice"}),
        );
        let (status, body) = send(state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            sse_frames(&body),
            vec![json!({"content": "Sure."}), json!({"done": true})]
        );
    }

    #[tokio::test]
    async fn test_chat_v2_error_event_then_done() {
        let state = state_with(ScriptedLlm::failing("upstream down"), InMemoryVectorStore::new());
        let request = json_request(Method::POST, "/api/chatV2", json!({"message": "hi"}));
        let (_, body) = send(state, request).await;

        let frames = sse_frames(&body);
        assert_eq!(frames.len(), 2);
        assert!(frames[0]["error"].as_str().unwrap().contains("upstream down"));
        assert_eq!(frames[1], json!({"done": true}));
    }

    #[tokio::test]
    async fn test_transcript_reset_after_delete() {
        let state = state();
        let alice = TenantId::new("alice");
        let chat = |message: &str| {
            json_request(
                Method::POST,
                "/api/chatV2",
                json!({"message": message, "user_id": "alice"}),
            )
        };

        send(state.clone(), chat("first")).await;
        assert_eq!(state.transcripts.snapshot(&alice).await.unwrap().len(), 3);

        let request = json_request(
            Method::DELETE,
            "/api/del_episodic_memory",
            json!({"user_id": "alice"}),
        );
        let (status, body) = send_json(state.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": true, "message": "Episodic memory for user alice deleted"})
        );

        assert!(!state.transcripts.contains(&alice));

        send(state.clone(), chat("hi")).await;
        let transcript = state.transcripts.snapshot(&alice).await.unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].role, MessageRole::System);
        assert_eq!(transcript[1], Message::user("hi"));
    }

    #[tokio::test]
    async fn test_transcript_after_delete_and_failed_reply_has_two_messages() {
        let state = state_with(ScriptedLlm::failing("down"), InMemoryVectorStore::new());
        let alice = TenantId::new("alice");
        state.transcripts.lock(&alice).await.push(Message::system("old"));

        let request = json_request(
            Method::DELETE,
            "/api/del_episodic_memory",
            json!({"user_id": "alice"}),
        );
        let (status, _) = send_json(state.clone(), request).await;
        assert_eq!(status, StatusCode::OK);

        let request = json_request(
            Method::POST,
            "/api/chatV2",
            json!({"message": "hi", "user_id": "alice"}),
        );
        send(state.clone(), request).await;

        let transcript = state.transcripts.snapshot(&alice).await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, MessageRole::System);
        assert_eq!(transcript[1], Message::user("hi"));
    }

    #[tokio::test]
    async fn test_del_episodic_unknown_tenant_is_404() {
        let request = json_request(
            Method::DELETE,
            "/api/del_episodic_memory",
            json!({"user_id": "nobody"}),
        );
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "User nobody not found"}));

        let request = json_request(Method::DELETE, "/api/del_episodic_memory", json!({}));
        let (status, _) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_episodic_without_transcript_is_500() {
        let request = json_request(
            Method::POST,
            "/api/save_episodic_memory",
            json!({"user_id": "alice"}),
        );
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "no conversation"}));
    }

    #[tokio::test]
    async fn test_save_episodic_stores_reflection() {
        let reflection = json!({
            "context_tags": ["tiling", "bathroom"],
            "conversation_summary": "User asked about tiling.",
            "what_worked": "Short answers.",
            "what_to_avoid": "N/A"
        })
        .to_string();
        let llm = ScriptedLlm::replying(reflection).then_reply("Use thinset.");
        let store = InMemoryVectorStore::new();
        let state = state_with(llm, store.clone());

        let request = json_request(
            Method::POST,
            "/api/chatV2",
            json!({"message": "How do I tile?", "user_id": "alice"}),
        );
        send(state.clone(), request).await;

        let request = json_request(
            Method::POST,
            "/api/save_episodic_memory",
            json!({"user_id": "alice"}),
        );
        let (status, body) = send_json(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success"}));

        let points = store.points("episodic_memory_alice");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].payload["what_worked"], "Short answers.");
    }

    #[tokio::test]
    async fn test_share_requires_url() {
        let request = json_request(Method::POST, "/api/chatgpt-share", json!({}));
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "URL is required"}));
    }

    #[tokio::test]
    async fn test_share_uses_requested_strategy() {
        let request = json_request(
            Method::POST,
            "/api/chatgpt-share",
            json!({"url": "https://chatgpt.com/share/abc"}),
        );
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Answered by rendered");

        let request = json_request(
            Method::POST,
            "/api/chatgpt-share",
            json!({"url": "https://chatgpt.com/share/abc", "strategy": "raw_html"}),
        );
        let (status, body) = send_json(state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("could not extract messages"));
    }
}
