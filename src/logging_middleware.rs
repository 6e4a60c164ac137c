// src/logging_middleware.rs
//! Middleware for logging JSON request and response bodies in debug mode

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, enabled, Level};

/// Bodies above this size are passed through without being logged.
const MAX_LOGGED_BODY: usize = 16 * 1024;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Buffers `body` and returns it, logging it at debug level when small enough.
async fn capture(body: Body, label: &str, context: &str) -> Result<Body, StatusCode> {
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() && bytes.len() <= MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            debug!(context = %context, body = %text, "{}", label);
        }
    }

    Ok(Body::from(bytes))
}

/// Logs JSON bodies. The OAuth routes are never logged since their
/// exchanges carry codes and session cookies.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) || request.uri().path().starts_with("/auth/") {
        return Ok(next.run(request).await);
    }

    let context = format!("{} {}", request.method(), request.uri().path());

    let request = if is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        let body = capture(body, "Request", &context).await?;
        Request::from_parts(parts, body)
    } else {
        request
    };

    let response = next.run(request).await;

    if !is_json(response.headers()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let context = format!("{} -> {}", context, parts.status);
    let body = capture(body, "Response", &context).await?;
    Ok(Response::from_parts(parts, body))
}
