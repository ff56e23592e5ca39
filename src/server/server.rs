//! The render server core
//!
//! Owns the middleware pipeline, the resource registry, and the bound
//! listeners, and drives the two lifecycle operations: `ready` assembles
//! the pipeline, `listen` binds a socket and serves it.

use crate::config::Config;
use crate::hooks::{events, HookBus, HookPayload};
use crate::middleware::{
    DevHandlers, DevMiddleware, ErrorMiddleware, ModernNegotiation, OpenInEditor,
    RenderMiddleware, ServeStatic,
};
use crate::pipeline::{normalize_path, Handler, Middleware, MiddlewareSource, Pipeline};
use crate::render::Renderer;
use crate::resolver::ModuleResolver;
use crate::resources::ResourceRegistry;
use crate::server::listener::{load_tls_config, ListenOptions, Listener};
use crate::server::state::AppState;
use crate::utils::error::{Result, ServerError};
use parking_lot::RwLock;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// The server core. Construct through [`crate::server::ServerBuilder`].
pub struct Server {
    config: Config,
    resources: ResourceRegistry,
    pipeline: Pipeline,
    hooks: HookBus,
    resolver: Arc<dyn ModuleResolver>,
    renderer: Arc<dyn Renderer>,
    dev_handlers: DevHandlers,
    extra_middleware: RwLock<Vec<Middleware>>,
    compressor: Option<Arc<dyn Handler>>,
    tls_override: Option<rustls::ServerConfig>,
    listeners: RwLock<Vec<Arc<Listener>>>,
}

impl Server {
    pub(crate) fn new(
        config: Config,
        renderer: Arc<dyn Renderer>,
        resolver: Arc<dyn ModuleResolver>,
        hooks: HookBus,
        extra_middleware: Vec<Middleware>,
        compressor: Option<Arc<dyn Handler>>,
        tls: Option<rustls::ServerConfig>,
    ) -> Self {
        Self {
            config,
            resources: ResourceRegistry::new(),
            pipeline: Pipeline::new(),
            hooks,
            resolver,
            renderer,
            dev_handlers: DevHandlers::new(),
            extra_middleware: RwLock::new(extra_middleware),
            compressor,
            tls_override: tls,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hooks(&self) -> &HookBus {
        &self.hooks
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Registries the build integration installs dev/hot handlers into.
    pub fn dev_handlers(&self) -> &DevHandlers {
        &self.dev_handlers
    }

    /// Queue a middleware for installation during [`Server::ready`].
    ///
    /// Queued middleware install after the configured entries, in call
    /// order. After `ready` the pipeline is assembled and this has no
    /// further effect.
    pub fn add_middleware(&self, middleware: Middleware) {
        self.extra_middleware.write().push(middleware);
    }

    /// Initialize the renderer and assemble the middleware pipeline.
    ///
    /// Fails fast: any unresolved middleware name or renderer failure
    /// surfaces here, before a socket is ever bound.
    pub async fn ready(&self) -> Result<()> {
        self.hooks.call(events::RENDER_BEFORE, HookPayload::None).await?;

        self.renderer.ready(&self.resources).await?;
        self.setup_middleware().await?;

        self.hooks.call(events::RENDER_DONE, HookPayload::None).await?;
        info!(entries = self.pipeline.entry_count(), "server ready");
        Ok(())
    }

    /// Install the fixed middleware phases, in order.
    async fn setup_middleware(&self) -> Result<()> {
        let base = &self.config.router.base;

        // Host-registered middleware goes in front of everything.
        self.hooks
            .call(
                events::RENDER_SETUP_MIDDLEWARE,
                HookPayload::Pipeline(self.pipeline.clone()),
            )
            .await?;

        // Compression is production-only; dev responses stay identity.
        if !self.config.dev && !self.config.render.compression_disabled() {
            match self.compressor.clone() {
                Some(handler) => self.use_middleware(Middleware::handler(handler))?,
                None => self.install(
                    &Middleware::Named("compression".to_string()),
                    Some(&self.config.render.compressor),
                )?,
            }
        }

        if self.config.modern.is_server() {
            self.use_middleware(Middleware::handler(Arc::new(ModernNegotiation)))?;
        }

        if self.config.dev {
            self.use_middleware(Middleware::handler(Arc::new(DevMiddleware::new(
                self.dev_handlers.clone(),
            ))))?;

            if self.config.debug {
                self.use_middleware(Middleware::scoped(
                    "__open-in-editor",
                    true,
                    Arc::new(OpenInEditor::new(self.config.editor.clone())),
                ))?;
            }
        }

        let static_dir = self.config.dirs.static_path();
        if static_dir.is_dir() {
            self.use_middleware(Middleware::Scoped {
                path: None,
                prefix: self.config.render.static_prefix,
                handler: MiddlewareSource::Handler(Arc::new(ServeStatic::new(static_dir))),
            })?;
        }

        // Built client assets are served locally only when the public path
        // is a path, not a URL pointing at a CDN. The mount sits under the
        // router base like any other prefixed middleware.
        if !self.config.dev {
            if let Some(public_path) = self.local_public_path() {
                let dist = Path::new(&self.config.build.build_dir).join("dist/client");
                if dist.is_dir() {
                    self.use_middleware(Middleware::Scoped {
                        path: Some(public_path),
                        prefix: true,
                        handler: MiddlewareSource::Handler(Arc::new(ServeStatic::new(dist))),
                    })?;
                }
            }
        }

        for entry in self.config.server_middleware.clone() {
            let (middleware, settings) = entry.into_middleware();
            self.install(&middleware, settings.as_ref())?;
        }
        for middleware in self.extra_middleware.write().drain(..) {
            self.install(&middleware, None)?;
        }

        // Host-registered error middleware runs before the framework's.
        self.hooks
            .call(
                events::RENDER_ERROR_MIDDLEWARE,
                HookPayload::Pipeline(self.pipeline.clone()),
            )
            .await?;

        self.pipeline.register(
            normalize_path(base, ""),
            Arc::new(RenderMiddleware::new(
                self.renderer.clone(),
                self.resources.clone(),
            )),
        );
        self.pipeline
            .register_error(Arc::new(ErrorMiddleware::new(self.config.dev)));

        Ok(())
    }

    /// Install one middleware at its effective mount path.
    pub fn use_middleware(&self, middleware: Middleware) -> Result<()> {
        self.install(&middleware, None)
    }

    fn install(
        &self,
        middleware: &Middleware,
        settings: Option<&serde_json::Value>,
    ) -> Result<()> {
        let base = &self.config.router.base;
        let (path, handler) = match middleware {
            Middleware::Handler(handler) => (normalize_path(base, ""), handler.clone()),
            Middleware::Named(name) => {
                (normalize_path(base, ""), self.resolver.resolve(name, settings)?)
            }
            Middleware::Scoped { path, prefix, handler } => {
                let effective_base = if *prefix { base.as_str() } else { "" };
                let declared = path.as_deref().unwrap_or("");
                let handler = match handler {
                    MiddlewareSource::Handler(handler) => handler.clone(),
                    MiddlewareSource::Named(name) => self.resolver.resolve(name, settings)?,
                };
                (normalize_path(effective_base, declared), handler)
            }
        };
        self.pipeline.register(path, handler);
        Ok(())
    }

    /// Bind a listener on the configured target and start serving.
    pub async fn listen(&self) -> Result<Arc<Listener>> {
        self.listen_on(None, None, None).await
    }

    /// Bind a listener, overriding parts of the configured target.
    ///
    /// Binding target precedence: socket argument, then configured socket,
    /// then host/port. Subscribes the listener to the `close` hook and
    /// publishes `listen` once the socket is live.
    pub async fn listen_on(
        &self,
        port: Option<u16>,
        host: Option<String>,
        socket: Option<String>,
    ) -> Result<Arc<Listener>> {
        let server = &self.config.server;
        let host = host.unwrap_or_else(|| server.host.clone());
        let port = port.unwrap_or(server.port);
        let socket = socket.or_else(|| server.socket.clone());

        let tls = if server.https_enabled() && socket.is_none() {
            // Cloned, not taken: every HTTPS listener gets the override.
            match self.tls_override.clone() {
                Some(tls) => Some(tls),
                None => match server.tls_files() {
                    Some(files) => Some(load_tls_config(&files.cert_file, &files.key_file)?),
                    None => {
                        return Err(ServerError::Bind {
                            addr: format!("{host}:{port}"),
                            source: io::Error::new(
                                io::ErrorKind::InvalidInput,
                                "https enabled without certificates",
                            ),
                        })
                    }
                },
            }
        } else {
            None
        };

        let listener = Arc::new(Listener::bind(
            ListenOptions {
                host,
                port,
                socket,
                workers: server.workers,
                tls,
            },
            AppState {
                pipeline: self.pipeline.clone(),
            },
        )?);

        self.listeners.write().push(listener.clone());

        // Every listener tears itself down on the close event.
        {
            let listener = listener.clone();
            self.hooks.hook(events::CLOSE, move |_| {
                let listener = listener.clone();
                async move { listener.destroy().await }
            });
        }

        self.hooks
            .call(events::LISTEN, HookPayload::Listen(listener.clone()))
            .await?;

        info!(url = %listener.display_url(), "listening");
        Ok(listener)
    }

    /// All listeners bound so far, including destroyed ones.
    pub fn listeners(&self) -> Vec<Arc<Listener>> {
        self.listeners.read().clone()
    }

    /// Publish the close event, destroying every bound listener.
    pub async fn close(&self) -> Result<()> {
        debug!("closing server");
        self.hooks.call(events::CLOSE, HookPayload::None).await
    }

    /// Ask the renderer to repopulate the resource registry.
    ///
    /// Used by build integrations after a rebuild; in-flight requests keep
    /// the snapshot they started with.
    pub async fn load_resources(&self) -> Result<()> {
        self.renderer.load_resources(&self.resources).await
    }

    /// Render one route through the injected renderer.
    pub async fn render_route(
        &self,
        url: &str,
        cx: crate::render::RenderContext,
    ) -> Result<crate::render::RenderedRoute> {
        self.renderer.render_route(url, cx).await
    }

    /// Public path usable as a local mount, or `None` when assets live on
    /// a CDN.
    fn local_public_path(&self) -> Option<String> {
        let public_path = &self.config.build.public_path;
        if public_path.starts_with("http://")
            || public_path.starts_with("https://")
            || public_path.starts_with("//")
        {
            None
        } else {
            Some(public_path.clone())
        }
    }
}
