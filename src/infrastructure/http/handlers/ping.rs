//! Ping Handler
//!
//! GET /api/ping 健康检查，同时报告语音管线的启用情况

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tts_enabled: bool,
    pub transcode_enabled: bool,
}

/// 不访问任何上游服务
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let handler = &state.send_chat_handler;
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tts_enabled: handler.speaks(),
        transcode_enabled: handler.transcodes(),
    })
}
