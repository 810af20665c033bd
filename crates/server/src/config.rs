use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use store::BackendConfig;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level (tracing env-filter directive)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Service name reported by health endpoints and logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment label (prod, staging, dev, ...)
    #[serde(default = "default_env")]
    pub env: String,

    /// Shared secret for the admin endpoints. When unset, admin routes
    /// reject every request.
    #[serde(default)]
    pub admin_key: Option<String>,

    /// Path to a JSON catalog snapshot to serve. When unset, the server
    /// starts over an empty in-memory catalog.
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            service_name: default_service_name(),
            env: default_env(),
            admin_key: None,
            snapshot_path: None,
            metrics_enabled: default_true(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("petxref").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("PETXREF").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;

        if config.admin_key.is_none() {
            tracing::warn!("No admin key configured, admin endpoints will reject all requests");
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// Backend selection for the catalog store.
    pub fn backend_config(&self) -> BackendConfig {
        match &self.snapshot_path {
            Some(path) => BackendConfig::snapshot(path.clone()),
            None => BackendConfig::in_memory(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "petxref-api".to_string()
}

fn default_env() -> String {
    "prod".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 10);
        assert_eq!(cfg.service_name, "petxref-api");
        assert_eq!(cfg.env, "prod");
        assert!(cfg.admin_key.is_none());
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_backend_selection() {
        let cfg = ServerConfig::default();
        assert!(matches!(cfg.backend_config(), BackendConfig::InMemory));

        let cfg = ServerConfig {
            snapshot_path: Some("/data/catalog.json".to_string()),
            ..ServerConfig::default()
        };
        match cfg.backend_config() {
            BackendConfig::Snapshot { path } => assert_eq!(path, "/data/catalog.json"),
            other => panic!("unexpected backend config: {other:?}"),
        }
    }
}
