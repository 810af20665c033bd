use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use compare::CompareError;
use store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not authorized.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error("Database connectivity check failed.")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// API error response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// The envelope inside every error body. The `request_id` is filled in by
/// the request-id middleware before the response leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Compare(CompareError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Compare(CompareError::DataSource(_)) | ServerError::Store(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Forbidden => "FORBIDDEN",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Compare(CompareError::Validation(_)) => "BAD_REQUEST",
            ServerError::Compare(CompareError::DataSource(_)) => "DB_UNAVAILABLE",
            ServerError::Store(_) => "DB_UNAVAILABLE",
            ServerError::Internal(_) => "INTERNAL",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Structured context for store failures, so clients can tell a dead
    /// backend from a bad request without parsing the message.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServerError::Store(source) => {
                Some(json!([{"field": "db", "issue": source.to_string()}]))
            }
            ServerError::Compare(CompareError::DataSource(source)) => {
                Some(json!([{"field": "db", "issue": source.to_string()}]))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = ErrorDetail {
            code: self.error_code().to_string(),
            message: self.to_string(),
            request_id: None,
            details: self.details(),
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: detail.clone(),
            }),
        )
            .into_response();
        // Stashed for the request-id middleware, which rewrites the body
        // with the correlation id attached.
        response.extensions_mut().insert(detail);
        response
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = ServerError::Compare(CompareError::Validation(
            "product_tokens must be a list with at least 2 items".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "BAD_REQUEST");
        assert_eq!(
            err.to_string(),
            "product_tokens must be a list with at least 2 items"
        );
        assert!(err.details().is_none());
    }

    #[test]
    fn store_errors_are_service_unavailable_with_details() {
        let err = ServerError::Store(StoreError::backend("connection refused"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "DB_UNAVAILABLE");
        assert_eq!(err.to_string(), "Database connectivity check failed.");
        let details = err.details().unwrap();
        assert_eq!(details[0]["field"], "db");
    }

    #[test]
    fn data_source_errors_map_like_store_errors() {
        let err = ServerError::Compare(CompareError::DataSource(StoreError::backend(
            "connection refused",
        )));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "DB_UNAVAILABLE");
        assert!(err.details().is_some());
    }

    #[test]
    fn error_body_skips_absent_fields() {
        let detail = ErrorDetail {
            code: "NOT_FOUND".to_string(),
            message: "Product not found.".to_string(),
            request_id: None,
            details: None,
        };
        let body = serde_json::to_value(ErrorResponse { error: detail }).unwrap();
        assert!(body["error"].get("request_id").is_none());
        assert!(body["error"].get("details").is_none());
    }
}
