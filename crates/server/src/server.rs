//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (request ids, logging, timeout, compression, CORS)
//! - Prometheus recorder installation
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{admin_key_auth, log_requests, request_id};
use crate::routes::{admin, catalog, compare, health, meta};
use crate::routes::{api_info, not_found};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Build the Axum router with all routes and middleware.
///
/// Routes are divided into:
/// - Public routes: catalog reads, comparison, health, and metadata
/// - Admin routes: `/admin/*`, gated on the `x-admin-key` header
///
/// The request-id middleware is the outermost of ours so the correlation
/// id lands in every log line and every error body produced further in.
pub fn build_router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/db/ping", get(health::db_ping))
        .route("/catalog/products", get(catalog::list_products))
        .route("/catalog/products/{token}", get(catalog::product_detail))
        .route("/catalog/search", post(catalog::search_products))
        .route("/compare", post(compare::compare_products))
        .route("/meta/symptoms", get(meta::list_symptoms));

    let admin_routes = Router::new()
        .route("/admin/backfill", post(admin::run_backfill))
        .layer(from_fn_with_state(state.clone(), admin_key_auth));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::new(state.config.timeout()))
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the PetXref HTTP server.
///
/// Initializes logging and metrics, builds the catalog store the
/// configuration selects, and serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config);

    let mut state = ServerState::new(config.clone())?;
    if config.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics_handle(handle);
    }

    let app = build_router(Arc::new(state));
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        %addr,
        service = %config.service_name,
        env = %config.env,
        "Starting PetXref server"
    );
    tracing::info!(
        timeout_secs = config.timeout_secs,
        max_body_mb = config.max_body_size_mb,
        cors = config.enable_cors,
        metrics = config.metrics_enabled,
        snapshot = config.snapshot_path.as_deref().unwrap_or("<in-memory>"),
        "Server options"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ServerConfig) {
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .json()
        .init();
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorResponse;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use store::{CatalogStore, InMemoryBackend};
    use tower::ServiceExt;

    fn test_router(config: ServerConfig) -> Router {
        let store = CatalogStore::with_backend(Box::new(InMemoryBackend::new()));
        let state = ServerState::with_store(config, Arc::new(store));
        build_router(Arc::new(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_service_and_env() {
        let app = test_router(ServerConfig::default());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "petxref-api");
        assert_eq!(body["env"], "prod");
    }

    #[tokio::test]
    async fn unknown_routes_get_an_error_envelope_with_request_id() {
        let app = test_router(ServerConfig::default());
        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let header_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .expect("x-request-id header");

        let parsed: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(parsed.error.code, "NOT_FOUND");
        assert_eq!(parsed.error.message, "Route not found.");
        assert_eq!(parsed.error.request_id.as_deref(), Some(header_id.as_str()));
    }

    #[tokio::test]
    async fn caller_supplied_request_id_is_echoed() {
        let app = test_router(ServerConfig::default());
        let response = app
            .oneshot(
                Request::get("/nope")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("x-request-id").unwrap(),
            &"req-123"
        );
        let body = body_json(response).await;
        assert_eq!(body["error"]["request_id"], "req-123");
    }

    #[tokio::test]
    async fn admin_routes_require_the_admin_key() {
        let config = ServerConfig {
            admin_key: Some("sekrit".to_string()),
            ..ServerConfig::default()
        };

        let response = test_router(config.clone())
            .oneshot(
                Request::post("/admin/backfill")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let response = test_router(config)
            .oneshot(
                Request::post("/admin/backfill")
                    .header("x-admin-key", "sekrit")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["backfilled"], 0);
    }

    #[tokio::test]
    async fn admin_routes_reject_everything_without_a_configured_key() {
        let app = test_router(ServerConfig::default());
        let response = app
            .oneshot(
                Request::post("/admin/backfill")
                    .header("x-admin-key", "anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn metrics_endpoint_is_empty_without_a_recorder() {
        let app = test_router(ServerConfig::default());
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
