//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the PetXref
//! server. Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, store ping, and metrics
//! - `catalog`: Product listing, detail, and search
//! - `compare`: Cross-product ingredient comparison
//! - `admin`: Canonical-id backfill (admin-key gated)
//! - `meta`: Static metadata for the web client

pub mod admin;
pub mod catalog;
pub mod compare;
pub mod health;
pub mod meta;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "PetXref API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/compare",
            "/catalog/products",
            "/catalog/products/{token}",
            "/catalog/search",
            "/meta/symptoms",
            "/admin/backfill",
            "/health",
            "/ready",
            "/metrics",
            "/db/ping"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Route not found.".to_string())
}
