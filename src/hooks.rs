//! Lifecycle hook bus
//!
//! The host application extends server behavior at named lifecycle points by
//! subscribing async callbacks. Publishing an event awaits every subscriber
//! sequentially, in subscription order; the first subscriber error aborts the
//! triggering operation. Hooks are never fire-and-forget.
//!
//! The bus is an explicit injected dependency of the server lifecycle rather
//! than an ambient emitter, so tests can observe and drive it directly.

use crate::pipeline::Pipeline;
use crate::server::Listener;
use crate::utils::error::Result;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Well-known lifecycle event names.
pub mod events {
    /// Before the renderer is initialized
    pub const RENDER_BEFORE: &str = "render:before";
    /// Before any framework middleware is registered; payload: pipeline handle
    pub const RENDER_SETUP_MIDDLEWARE: &str = "render:setupMiddleware";
    /// Before the framework error middleware is registered; payload: pipeline handle
    pub const RENDER_ERROR_MIDDLEWARE: &str = "render:errorMiddleware";
    /// After the pipeline is fully assembled
    pub const RENDER_DONE: &str = "render:done";
    /// After a successful bind; payload: listener handle
    pub const LISTEN: &str = "listen";
    /// Shutdown request; subscribers resolve once their listener is destroyed
    pub const CLOSE: &str = "close";
}

/// Payload delivered to hook subscribers.
#[derive(Clone, Default)]
pub enum HookPayload {
    /// No payload
    #[default]
    None,
    /// The middleware pipeline, open for registration
    Pipeline(Pipeline),
    /// A live listener and its bound address
    Listen(Arc<Listener>),
}

impl HookPayload {
    /// Pipeline payload, if this event carries one.
    pub fn pipeline(&self) -> Option<&Pipeline> {
        match self {
            HookPayload::Pipeline(pipeline) => Some(pipeline),
            _ => None,
        }
    }

    /// Listener payload, if this event carries one.
    pub fn listener(&self) -> Option<&Arc<Listener>> {
        match self {
            HookPayload::Listen(listener) => Some(listener),
            _ => None,
        }
    }
}

type HookFn = Arc<dyn Fn(HookPayload) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Asynchronous publish/subscribe bus for lifecycle events.
///
/// Cloning the bus clones the handle; all clones share the same subscribers.
#[derive(Clone, Default)]
pub struct HookBus {
    inner: Arc<RwLock<HashMap<String, Vec<HookFn>>>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an async callback to a named event.
    pub fn hook<F, Fut>(&self, event: &str, callback: F)
    where
        F: Fn(HookPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let callback: HookFn = Arc::new(move |payload| Box::pin(callback(payload)));
        self.inner
            .write()
            .entry(event.to_string())
            .or_default()
            .push(callback);
    }

    /// Publish an event, awaiting every subscriber in subscription order.
    ///
    /// Stops at the first failing subscriber and returns its error.
    pub async fn call(&self, event: &str, payload: HookPayload) -> Result<()> {
        // Clone the subscriber list out of the lock; callbacks may suspend,
        // and new subscriptions made while we await (e.g. the close hook
        // registered from inside the listen hook) must not deadlock.
        let subscribers = self
            .inner
            .read()
            .get(event)
            .cloned()
            .unwrap_or_default();

        for subscriber in subscribers {
            subscriber(payload.clone()).await?;
        }
        Ok(())
    }

    /// Number of subscribers currently registered for an event.
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.inner.read().get(event).map_or(0, Vec::len)
    }
}
