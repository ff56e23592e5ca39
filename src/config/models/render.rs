//! Rendering and middleware configuration

use serde::Deserialize;

/// Rendering options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Compressor settings handed to the compression middleware factory.
    /// `false` disables compression entirely.
    pub compressor: serde_json::Value,
    /// Serve the static directory under the router base instead of `/`
    pub static_prefix: bool,
    /// Fallback template used when no built template is available
    pub spa_template: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            compressor: serde_json::Value::Object(Default::default()),
            static_prefix: false,
            spa_template: None,
        }
    }
}

impl RenderConfig {
    /// `compressor: false` switches the compression stage off.
    pub fn compression_disabled(&self) -> bool {
        self.compressor == serde_json::Value::Bool(false)
    }
}

/// How modern-bundle negotiation behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModernMode {
    /// No negotiation; every client gets the legacy bundle
    #[default]
    Off,
    /// The client picks its bundle; the server does not inspect user agents
    Client,
    /// The server inspects the user agent per request
    Server,
}

impl ModernMode {
    pub fn is_server(&self) -> bool {
        matches!(self, ModernMode::Server)
    }
}

/// A user middleware declaration: a bare handler name, or a handler
/// scoped under a path.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServerMiddlewareConfig {
    Named(String),
    Scoped {
        #[serde(default)]
        path: Option<String>,
        #[serde(default = "default_prefix")]
        prefix: bool,
        handler: String,
        #[serde(default)]
        options: Option<serde_json::Value>,
    },
}

fn default_prefix() -> bool {
    true
}

impl ServerMiddlewareConfig {
    /// Convert into a registration value plus the settings for its resolver.
    pub fn into_middleware(self) -> (crate::pipeline::Middleware, Option<serde_json::Value>) {
        use crate::pipeline::{Middleware, MiddlewareSource};
        match self {
            ServerMiddlewareConfig::Named(name) => (Middleware::Named(name), None),
            ServerMiddlewareConfig::Scoped {
                path,
                prefix,
                handler,
                options,
            } => (
                Middleware::Scoped {
                    path,
                    prefix,
                    handler: MiddlewareSource::Named(handler),
                },
                options,
            ),
        }
    }
}
