//! Configuration management for the render server
//!
//! This module handles loading, validation, and merging of all server
//! configuration.

pub mod models;

pub use models::*;

use crate::utils::error::{Result, ServerError};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the render server
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Development mode
    pub dev: bool,
    /// Debug endpoints (open-in-editor) in development
    pub debug: bool,
    /// Modern-bundle negotiation mode
    pub modern: ModernMode,
    /// Editor command used by the open-in-editor endpoint
    pub editor: Option<String>,
    /// Listener configuration
    pub server: ServerConfig,
    /// Rendering configuration
    pub render: RenderConfig,
    /// Router configuration
    pub router: RouterConfig,
    /// Build output configuration
    pub build: BuildConfig,
    /// Project directory layout
    pub dirs: DirsConfig,
    /// User-registered middleware, installed in declaration order
    pub server_middleware: Vec<ServerMiddlewareConfig>,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServerError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ServerError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.server
            .validate()
            .map_err(|e| ServerError::Config(format!("Server config error: {}", e)))?;

        if !self.router.base.starts_with('/') {
            return Err(ServerError::Config(format!(
                "Router base must start with '/': {}",
                self.router.base
            )));
        }

        for entry in &self.server_middleware {
            if let ServerMiddlewareConfig::Scoped { handler, .. } = entry {
                if handler.is_empty() {
                    return Err(ServerError::Config(
                        "server_middleware entry has an empty handler name".to_string(),
                    ));
                }
            }
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Config) -> Self {
        self.dev = other.dev;
        self.debug = other.debug;
        self.modern = other.modern;
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        self.server = self.server.merge(other.server);
        self.render = other.render;
        self.router = other.router;
        self.build = other.build;
        self.dirs = other.dirs;
        if !other.server_middleware.is_empty() {
            self.server_middleware = other.server_middleware;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.router.base, "/");
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
dev: true
debug: true
modern: client
editor: code
server:
  host: 0.0.0.0
  port: 8080
render:
  static_prefix: true
server_middleware:
  - body-parser
  - path: /api
    handler: api-logger
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.dev);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.modern, ModernMode::Client);
        assert!(config.render.static_prefix);
        assert_eq!(config.server_middleware.len(), 2);
        assert!(matches!(
            &config.server_middleware[0],
            ServerMiddlewareConfig::Named(name) if name == "body-parser"
        ));
        assert!(matches!(
            &config.server_middleware[1],
            ServerMiddlewareConfig::Scoped { path: Some(p), prefix: true, handler, .. }
                if p == "/api" && handler == "api-logger"
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_router_base_is_rejected() {
        let mut config = Config::default();
        config.router.base = "app".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_prefers_the_overlay() {
        let base = Config::default();
        let overlay: Config = serde_yaml::from_str("dev: true\nserver:\n  port: 4000\n").unwrap();
        let merged = base.merge(overlay);
        assert!(merged.dev);
        assert_eq!(merged.server.port, 4000);
        assert_eq!(merged.server.host, "127.0.0.1");
    }
}
