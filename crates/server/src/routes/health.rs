use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "env": state.config.env,
        "time": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Reports per-component state. The rule cache is lazy, so "lazy" is a
/// ready state: the first canonical comparison fills it.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let store_ready = state.store.ping().is_ok();
    let rules = if state.engine.rules_loaded() {
        "loaded"
    } else {
        "lazy"
    };

    let status = if store_ready { "ready" } else { "degraded" };
    let body = Json(json!({
        "status": status,
        "service": state.config.service_name,
        "time": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "store": if store_ready { "ready" } else { "unavailable" },
            "rules": rules,
        }
    }));

    let code = if store_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, body)
}

/// Store connectivity probe
pub async fn db_ping(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    state.store.ping()?;
    Ok(Json(json!({"ok": true})))
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    if !state.config.metrics_enabled {
        return Err(ServerError::NotFound("Metrics are disabled.".to_string()));
    }

    let body = state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    Ok(body)
}
