//! PetXref Server - HTTP REST API for the product catalog
//!
//! This crate provides the HTTP edge of PetXref. It exposes:
//!
//! - **Catalog Reads**: Product listing, detail with the latest ingredient
//!   list, and filtered search
//! - **Comparison**: Cross-product ingredient comparison in raw or
//!   canonical mode
//! - **Admin**: Canonical-id backfill behind an admin key
//! - **Health & Metrics**: Liveness/readiness probes, a store connectivity
//!   probe, and Prometheus metrics
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request-id correlation (header and
//!   error body), structured request logging
//! - **Configuration**: `petxref.toml` file plus `PETXREF_*` environment
//!   overrides; store backend selection (in-memory or JSON snapshot)
//! - **Error Handling**: Every error renders as
//!   `{"error": {"code", "message", "request_id", "details?"}}`
//! - **Graceful Shutdown**: SIGTERM / Ctrl+C handling
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe with component states
//! - `GET /metrics` - Prometheus metrics
//! - `GET /db/ping` - Store connectivity probe
//! - `GET /catalog/products` - List active products
//! - `GET /catalog/products/{token}` - Product detail by UUID or slug
//! - `POST /catalog/search` - Filtered product search
//! - `POST /compare` - Compare ingredient lists across products
//! - `GET /meta/symptoms` - Symptom picker metadata
//!
//! ## Admin (`x-admin-key` header required)
//!
//! - `POST /admin/backfill` - Backfill canonical ids for unmapped items

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ErrorDetail, ErrorResponse, ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
