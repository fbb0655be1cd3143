//! Chat Handler
//!
//! POST /api/chat

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::application::SendChatCommand;
use crate::infrastructure::http::dto::{ChatRequest, ChatResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::server::MAX_BODY_BYTES;
use crate::infrastructure::http::state::AppState;

/// 处理一条消息
///
/// 语法、类型或 Content-Type 不对的请求体按缺少 message 处理；
/// 读取请求体失败（包括超过大小上限）如实返回
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = match payload {
        Ok(Json(req)) => req.message.unwrap_or_default(),
        Err(JsonRejection::BytesRejection(rejection)) => {
            return Err(if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge(format!(
                    "Request body exceeds {} bytes",
                    MAX_BODY_BYTES
                ))
            } else {
                ApiError::BadRequest(rejection.body_text())
            });
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected chat request body");
            String::new()
        }
    };

    let result = state
        .send_chat_handler
        .handle(SendChatCommand { message })
        .await?;

    Ok(Json(result.into()))
}
