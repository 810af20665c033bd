use crate::error::{ErrorDetail, ErrorResponse, ServerError};
use crate::state::ServerState;
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

/// Request ID middleware.
///
/// Accepts a caller-supplied `x-request-id` or generates one, makes it
/// available to handlers via request extensions, echoes it in the response
/// header, and rewrites error bodies so the correlation id rides inside the
/// error envelope. Must be the outermost of our middleware so every error
/// produced further in carries the id.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Some(detail) = response.extensions().get::<ErrorDetail>().cloned() {
        let status = response.status();
        let error = ErrorDetail {
            request_id: Some(request_id.clone()),
            ..detail
        };
        response = (status, Json(ErrorResponse { error })).into_response();
    }

    // The id came from a header or a UUID, so it is always a valid value.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    // Get request ID if available
    let request_id = request
        .extensions()
        .get::<String>()
        .cloned()
        .unwrap_or_default();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    metrics::counter!(
        "petxref_http_requests_total",
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!("petxref_http_request_duration_seconds").record(duration.as_secs_f64());

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}

/// Admin key authentication middleware.
///
/// Admin routes require the `x-admin-key` header to match the configured
/// key. With no key configured, every request is rejected.
pub async fn admin_key_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let presented = request
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok());

    match (state.config.admin_key.as_deref(), presented) {
        (Some(expected), Some(given)) if expected == given => Ok(next.run(request).await),
        _ => Err(ServerError::Forbidden),
    }
}
