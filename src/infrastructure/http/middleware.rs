//! HTTP Middleware
//!
//! 对 4xx/5xx 响应统一记录方法、路径、状态码与耗时

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// 错误响应日志中间件
///
/// 错误详情已在 ApiError::into_response() 中记录，这里只补充请求维度的信息
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::error!(%method, %path, status, elapsed_ms, "Request failed");
    } else if response.status().is_client_error() {
        tracing::warn!(%method, %path, status, elapsed_ms, "Request rejected");
    }

    response
}
