//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::{create_routes, StaticMounts};
use super::state::AppState;

/// 请求体大小上限，聊天消息用不到更多
pub(crate) const MAX_BODY_BYTES: usize = 64 * 1024;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mounts: StaticMounts,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            mounts: StaticMounts::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, mounts: StaticMounts) -> Self {
        Self {
            host: host.into(),
            port,
            mounts,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 构建 Router
    pub(crate) fn build_router(&self) -> Router {
        // CORS 配置 - 允许所有来源的跨域请求
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
            .expose_headers(Any)
            .max_age(std::time::Duration::from_secs(3600));

        create_routes(&self.config.mounts)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(middleware::from_fn(error_logging_middleware))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// 启动服务器
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {}", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeLlm, FakeTranscoder, FakeTts};
    use crate::application::{
        AudioTranscoderPort, ChatSettings, LlmEnginePort, SendChatHandler, TtsEnginePort,
    };
    use crate::config::NamingMode;
    use crate::infrastructure::adapters::{FileAudioStorage, FileAudioStorageConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    struct Harness {
        dir: TempDir,
        router: Router,
    }

    fn harness(
        llm: Arc<dyn LlmEnginePort>,
        tts: Option<Arc<dyn TtsEnginePort>>,
        transcoder: Option<Arc<dyn AudioTranscoderPort>>,
    ) -> Harness {
        let dir = TempDir::new().unwrap();
        let audio_dir = dir.path().join("audio");
        let storage = Arc::new(FileAudioStorage::new(FileAudioStorageConfig {
            base_dir: audio_dir.clone(),
            url_prefix: "/audio".to_string(),
            naming: NamingMode::Fixed,
            max_artifacts: 8,
        }));
        let handler = SendChatHandler::new(
            llm,
            tts,
            transcoder,
            storage,
            ChatSettings {
                system_prompt: "be brief".to_string(),
                max_tokens: 100,
                fallback_to_text: false,
            },
        );
        let config = ServerConfig::new(
            "127.0.0.1",
            0,
            StaticMounts {
                audio_dir,
                audio_url_prefix: "/audio".to_string(),
                web: None,
            },
        );
        let router = HttpServer::new(config, AppState::new(handler)).build_router();
        Harness { dir, router }
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(router, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn ping_request() -> Request<Body> {
        Request::builder()
            .uri("/api/ping")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping_reports_speech_pipeline() {
        let llm = Arc::new(FakeLlm::replying("hi"));
        let h = harness(llm.clone(), None, None);
        let (status, body) = send_json(&h.router, ping_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ttsEnabled"], false);
        assert_eq!(body["transcodeEnabled"], false);
        assert_eq!(llm.calls(), 0);

        let h = harness(
            Arc::new(FakeLlm::replying("hi")),
            Some(Arc::new(FakeTts::new())),
            Some(Arc::new(FakeTranscoder::copying())),
        );
        let (_, body) = send_json(&h.router, ping_request()).await;
        assert_eq!(body["ttsEnabled"], true);
        assert_eq!(body["transcodeEnabled"], true);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413_not_missing_message() {
        let llm = Arc::new(FakeLlm::replying("hi"));
        let h = harness(llm.clone(), None, None);

        let long_message = "a".repeat(70 * 1024);
        let body = json!({ "message": long_message }).to_string();
        let (status, json) = send_json(&h.router, chat_request(&body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_ne!(json["error"], "Message is required");
        assert!(json["error"].as_str().unwrap().contains("65536"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_messages_are_rejected_without_upstream_calls() {
        let llm = Arc::new(FakeLlm::replying("hi"));
        let tts = Arc::new(FakeTts::new());
        let h = harness(llm.clone(), Some(tts.clone()), None);

        for body in [
            r#"{"message": ""}"#,
            r#"{"message": "   "}"#,
            r#"{}"#,
            r#"{"message": 42}"#,
            "not json",
        ] {
            let (status, json) = send_json(&h.router, chat_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(json, json!({"error": "Message is required"}));
        }

        assert_eq!(llm.calls(), 0);
        assert_eq!(tts.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_returns_text_and_serves_audio() {
        let h = harness(
            Arc::new(FakeLlm::replying(" Wear sunglasses. ")),
            Some(Arc::new(FakeTts::new())),
            None,
        );

        let (status, json) =
            send_json(&h.router, chat_request(r#"{"message": "sun and eyes?"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({"response": "Wear sunglasses.", "audioUrl": "/audio/speech.mp3"})
        );

        let on_disk = std::fs::read(h.dir.path().join("audio/speech.mp3")).unwrap();
        assert!(!on_disk.is_empty());

        let request = Request::builder()
            .uri("/audio/speech.mp3")
            .body(Body::empty())
            .unwrap();
        let (status, served) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(served, on_disk);
    }

    #[tokio::test]
    async fn test_text_only_when_tts_disabled() {
        let h = harness(Arc::new(FakeLlm::replying("Blink.")), None, None);
        let (status, json) = send_json(&h.router, chat_request(r#"{"message": "hi"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"response": "Blink."}));
    }

    #[tokio::test]
    async fn test_upstream_status_is_propagated() {
        let h = harness(
            Arc::new(FakeLlm::failing(401, "Incorrect API key provided")),
            None,
            None,
        );
        let (status, json) = send_json(&h.router, chat_request(r#"{"message": "hi"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, json!({"error": "Incorrect API key provided"}));
    }

    #[tokio::test]
    async fn test_tts_failure_returns_error_without_text() {
        let h = harness(
            Arc::new(FakeLlm::replying("Blink.")),
            Some(Arc::new(FakeTts::failing(503, "speech unavailable"))),
            None,
        );
        let (status, json) = send_json(&h.router, chat_request(r#"{"message": "hi"}"#)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(json.get("response").is_none());
        assert_eq!(json["error"], "speech unavailable");
    }

    #[tokio::test]
    async fn test_transcoder_failure_is_500_and_leaves_no_new_file() {
        let h = harness(
            Arc::new(FakeLlm::replying("Blink.")),
            Some(Arc::new(FakeTts::new())),
            Some(Arc::new(FakeTranscoder::failing())),
        );
        let (status, json) = send_json(&h.router, chat_request(r#"{"message": "hi"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json.get("response").is_none());
        assert!(!h.dir.path().join("audio/speech_processed.mp3").exists());
    }

    #[tokio::test]
    async fn test_missing_audio_is_404() {
        let h = harness(Arc::new(FakeLlm::replying("hi")), None, None);
        let request = Request::builder()
            .uri("/audio/nothing.mp3")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
