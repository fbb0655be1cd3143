//! HTTP Error Handling
//!
//! 错误响应使用真实的 HTTP 状态码，响应体为 `{"error": "..."}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorResponse;
use crate::application::ApplicationError;

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// 请求体超过大小上限
    PayloadTooLarge(String),
    /// 上游服务失败，携带上游状态码（如果有）
    Upstream { status: Option<u16>, message: String },
    Internal(String),
}

impl ApiError {
    /// 对应的 HTTP 状态码
    ///
    /// 上游状态码只有是合法的 4xx/5xx 时才透传，否则为 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::PayloadTooLarge(msg) => msg,
            ApiError::Upstream { message, .. } => message,
            ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::BadRequest(msg) | ApiError::PayloadTooLarge(msg) => {
                tracing::warn!(status = status.as_u16(), error = %msg, "Bad request");
            }
            ApiError::Upstream { message, .. } => {
                tracing::error!(status = status.as_u16(), error = %message, "Upstream service error");
            }
            ApiError::Internal(msg) => {
                tracing::error!(status = status.as_u16(), error = %msg, "Internal server error");
            }
        }

        let body = ErrorResponse {
            error: self.message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::UpstreamServiceError { status, message } => {
                ApiError::Upstream { status, message }
            }
            ApplicationError::StorageError(_) | ApplicationError::ProcessError(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}
