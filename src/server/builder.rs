//! Server builder and run_server function
//!
//! The builder wires the injectable collaborators (renderer, resolver,
//! hook bus, TLS) into a [`Server`]; `run_server` is the batteries-included
//! entry point used by the binary.

use crate::config::Config;
use crate::hooks::HookBus;
use crate::pipeline::{Handler, Middleware};
use crate::render::{HtmlRenderer, Renderer};
use crate::resolver::{ModuleResolver, StaticResolver};
use crate::server::server::Server;
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Builder for [`Server`].
pub struct ServerBuilder {
    config: Option<Config>,
    renderer: Option<Arc<dyn Renderer>>,
    resolver: Option<Arc<dyn ModuleResolver>>,
    hooks: Option<HookBus>,
    middleware: Vec<Middleware>,
    compressor: Option<Arc<dyn Handler>>,
    tls: Option<rustls::ServerConfig>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            renderer: None,
            resolver: None,
            hooks: None,
            middleware: Vec::new(),
            compressor: None,
            tls: None,
        }
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject a rendering collaborator
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Inject a middleware-name resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Share a hook bus with the host application
    pub fn with_hooks(mut self, hooks: HookBus) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Queue a middleware, installed after the configured entries
    pub fn with_middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Use a ready-made compression handler instead of the named
    /// `compression` module and its `render.compressor` settings
    pub fn with_compressor(mut self, compressor: Arc<dyn Handler>) -> Self {
        self.compressor = Some(compressor);
        self
    }

    /// Inject a prepared TLS configuration instead of certificate files
    pub fn with_tls(mut self, tls: rustls::ServerConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Build the server
    pub fn build(self) -> Server {
        let config = self.config.unwrap_or_default();
        // Without an injected renderer, fall back to template substitution
        // over the configured template file.
        let renderer = self.renderer.unwrap_or_else(|| {
            Arc::new(HtmlRenderer::new(
                config.render.spa_template.as_ref().map(PathBuf::from),
            ))
        });
        Server::new(
            config,
            renderer,
            self.resolver
                .unwrap_or_else(|| Arc::new(StaticResolver::with_defaults())),
            self.hooks.unwrap_or_default(),
            self.middleware,
            self.compressor,
            self.tls,
        )
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the server with automatic configuration loading.
///
/// Loads `config/renderd.yaml` when present, serves until interrupted,
/// then publishes the close event.
pub async fn run_server() -> Result<()> {
    let config_path = "config/renderd.yaml";
    let config = match Config::from_file(config_path).await {
        Ok(config) => config,
        Err(e) => {
            info!("No usable {config_path}, using default config: {e}");
            Config::default()
        }
    };

    let server = ServerBuilder::new().with_config(config).build();
    server.ready().await?;
    let listener = server.listen().await?;
    info!("Server running at {}", listener.display_url());

    tokio::signal::ctrl_c()
        .await
        .map_err(crate::utils::error::ServerError::Io)?;
    info!("Interrupt received, shutting down");
    server.close().await
}
