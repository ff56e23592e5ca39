//! Resolution of string-identified middleware
//!
//! Middleware may be registered by name; names are resolved exactly once, at
//! registration time, through the resolver injected into the server. A name
//! that does not resolve is a fatal startup error: the server never starts
//! with an unresolved middleware.

use crate::middleware::compression::Compression;
use crate::pipeline::Handler;
use crate::utils::error::{Result, ServerError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Instantiates a handler from a settings object.
///
/// Covers modules that are factories rather than handlers, like the
/// compression module configured with `{ threshold, level }`.
pub trait HandlerFactory: Send + Sync {
    fn create(&self, settings: &serde_json::Value) -> Result<Arc<dyn Handler>>;
}

/// The module-resolution collaborator.
pub trait ModuleResolver: Send + Sync {
    /// Resolve a name into an installable handler.
    ///
    /// `settings` is passed to factory modules; plain handler modules ignore
    /// it. Unknown names fail with [`ServerError::Resolution`].
    fn resolve(&self, name: &str, settings: Option<&serde_json::Value>)
        -> Result<Arc<dyn Handler>>;
}

enum Registered {
    Handler(Arc<dyn Handler>),
    Factory(Arc<dyn HandlerFactory>),
}

/// In-process resolver backed by a name registry.
#[derive(Default)]
pub struct StaticResolver {
    modules: RwLock<HashMap<String, Registered>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver with the framework's own modules pre-registered.
    pub fn with_defaults() -> Self {
        let resolver = Self::new();
        resolver.register_factory("compression", Arc::new(CompressionFactory));
        resolver
    }

    pub fn register(&self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        self.modules
            .write()
            .insert(name.into(), Registered::Handler(handler));
    }

    pub fn register_factory(&self, name: impl Into<String>, factory: Arc<dyn HandlerFactory>) {
        self.modules
            .write()
            .insert(name.into(), Registered::Factory(factory));
    }
}

impl ModuleResolver for StaticResolver {
    fn resolve(
        &self,
        name: &str,
        settings: Option<&serde_json::Value>,
    ) -> Result<Arc<dyn Handler>> {
        let modules = self.modules.read();
        match modules.get(name) {
            Some(Registered::Handler(handler)) => Ok(handler.clone()),
            Some(Registered::Factory(factory)) => {
                let default_settings = serde_json::Value::Object(Default::default());
                factory.create(settings.unwrap_or(&default_settings))
            }
            None => Err(ServerError::Resolution(name.to_string())),
        }
    }
}

struct CompressionFactory;

impl HandlerFactory for CompressionFactory {
    fn create(&self, settings: &serde_json::Value) -> Result<Arc<dyn Handler>> {
        Ok(Arc::new(Compression::from_settings(settings)))
    }
}
