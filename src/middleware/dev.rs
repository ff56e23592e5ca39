//! Development build-artifact middleware
//!
//! Only installed in development mode. Every request is dispatched to the
//! dev-bundle sub-handler and then the hot-reload sub-handler for the
//! bundle the client was negotiated onto, each awaited in turn. Sub-handlers
//! are installed by the build integration while the server is running.

use crate::pipeline::{Handler, Outcome, RequestCx};
use crate::utils::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Which client bundle a sub-handler serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleTarget {
    /// The legacy client bundle
    Client,
    /// The modern (native ES modules) bundle
    Modern,
}

impl BundleTarget {
    fn for_request(cx: &RequestCx) -> Self {
        if cx.is_modern() {
            BundleTarget::Modern
        } else {
            BundleTarget::Client
        }
    }
}

#[derive(Default)]
struct DevHandlersInner {
    dev: HashMap<BundleTarget, Arc<dyn Handler>>,
    hot: HashMap<BundleTarget, Arc<dyn Handler>>,
}

/// Shared registries of dev and hot-reload sub-handlers.
///
/// The server owns one of these; the build integration installs handlers
/// into it as bundles come up.
#[derive(Clone, Default)]
pub struct DevHandlers {
    inner: Arc<RwLock<DevHandlersInner>>,
}

impl DevHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dev(&self, target: BundleTarget, handler: Arc<dyn Handler>) {
        self.inner.write().dev.insert(target, handler);
    }

    pub fn set_hot(&self, target: BundleTarget, handler: Arc<dyn Handler>) {
        self.inner.write().hot.insert(target, handler);
    }

    fn for_target(&self, target: BundleTarget) -> (Option<Arc<dyn Handler>>, Option<Arc<dyn Handler>>) {
        let inner = self.inner.read();
        (inner.dev.get(&target).cloned(), inner.hot.get(&target).cloned())
    }
}

/// The development dispatch stage.
pub struct DevMiddleware {
    handlers: DevHandlers,
}

impl DevMiddleware {
    pub fn new(handlers: DevHandlers) -> Self {
        Self { handlers }
    }
}

#[async_trait(?Send)]
impl Handler for DevMiddleware {
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome> {
        let target = BundleTarget::for_request(cx);
        let (dev, hot) = self.handlers.for_target(target);

        for handler in [dev, hot].into_iter().flatten() {
            if let Outcome::Done(response) = handler.handle(cx).await? {
                return Ok(Outcome::Done(response));
            }
        }
        Ok(Outcome::Continue)
    }
}
