use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use compare::CompareEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use store::CatalogStore;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Catalog store (shared across requests)
    pub store: Arc<CatalogStore>,

    /// Comparison engine with its process-lifetime rule cache
    pub engine: Arc<CompareEngine>,

    /// Prometheus registry handle, present when metrics are enabled.
    /// `None` in tests so no global recorder is installed.
    pub metrics_handle: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state with the store the configuration selects.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = CatalogStore::new(config.backend_config())
            .map_err(|e| ServerError::Config(format!("catalog store init failed: {e}")))?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// Create server state over an existing store. Used by tests to seed
    /// an in-memory catalog.
    pub fn with_store(config: ServerConfig, store: Arc<CatalogStore>) -> Self {
        let engine = Arc::new(CompareEngine::new(store.clone()));
        Self {
            config: Arc::new(config),
            store,
            engine,
            metrics_handle: None,
        }
    }

    /// Attach the Prometheus handle rendered by `GET /metrics`.
    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
