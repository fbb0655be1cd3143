//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查
//! - /api/chat              POST  发送消息，返回回复文本与音频 URL
//! - {audio_prefix}/{file}  GET   音频产物静态访问（支持 Range）
//! - {web_path}             GET   可选的前端静态文件

use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

use super::handlers;
use super::state::AppState;

/// 静态文件挂载
#[derive(Debug, Clone)]
pub struct StaticMounts {
    /// 音频目录
    pub audio_dir: PathBuf,
    /// 音频 URL 前缀，如 "/audio"
    pub audio_url_prefix: String,
    /// 前端静态文件（目录，URL 前缀）
    pub web: Option<(PathBuf, String)>,
}

impl Default for StaticMounts {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("audio"),
            audio_url_prefix: "/audio".to_string(),
            web: None,
        }
    }
}

/// 创建所有路由
pub fn create_routes(mounts: &StaticMounts) -> Router<Arc<AppState>> {
    let audio_prefix = mounts.audio_url_prefix.trim_end_matches('/');

    let mut router = Router::new()
        .nest("/api", api_routes())
        .nest_service(audio_prefix, ServeDir::new(&mounts.audio_dir));

    if let Some((dir, path)) = &mounts.web {
        let path = path.trim_end_matches('/');
        // 根路径不能 nest，只能作为 fallback
        router = if path.is_empty() {
            router.fallback_service(ServeDir::new(dir))
        } else {
            router.nest_service(path, ServeDir::new(dir))
        };
    }

    router
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/chat", post(handlers::chat))
}
