//! Pipeline registration and the dispatch driver

use crate::pipeline::entry::{path_matches, MiddlewareEntry};
use crate::pipeline::handler::{ErrorHandler, Handler, Outcome, RequestCx};
use crate::utils::error::ServerError;
use actix_web::HttpResponse;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Default)]
struct PipelineInner {
    entries: Vec<MiddlewareEntry>,
    error_entries: Vec<Arc<dyn ErrorHandler>>,
}

/// The ordered middleware pipeline.
///
/// Registration happens during startup; dispatch reads a snapshot of the
/// entry list, so the registration lock is never held across a suspension
/// point. Request entries dispatch strictly in registration order, and error
/// entries always dispatch after every request entry.
#[derive(Clone, Default)]
pub struct Pipeline {
    inner: Arc<RwLock<PipelineInner>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler at a normalized mount path.
    ///
    /// Never reorders previously registered entries.
    pub fn register(&self, path: String, handler: Arc<dyn Handler>) {
        debug_assert!(!path.contains("//"), "mount path not normalized: {path}");
        debug!(path = %path, "middleware installed");
        self.inner.write().entries.push(MiddlewareEntry { path, handler });
    }

    /// Append an error handler.
    ///
    /// Error handlers run after all request handlers regardless of when they
    /// were registered relative to them.
    pub fn register_error(&self, handler: Arc<dyn ErrorHandler>) {
        self.inner.write().error_entries.push(handler);
    }

    /// Mount paths of the request entries, in dispatch order.
    pub fn entry_paths(&self) -> Vec<String> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|entry| entry.path.clone())
            .collect()
    }

    pub fn entry_count(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn error_entry_count(&self) -> usize {
        self.inner.read().error_entries.len()
    }

    /// Drive a request through the pipeline.
    ///
    /// Always produces a response: a stage failure is routed to the error
    /// entries, an exhausted pipeline yields 404, and a plain 500 backstop
    /// covers the pathological case of no error entry responding.
    pub async fn dispatch(&self, cx: &mut RequestCx) -> HttpResponse {
        let (entries, error_entries) = {
            let inner = self.inner.read();
            (inner.entries.clone(), inner.error_entries.clone())
        };

        let mut failure: Option<ServerError> = None;
        for entry in &entries {
            if !path_matches(&entry.path, cx.path()) {
                continue;
            }
            cx.set_mount(entry.path.clone());
            match entry.handler.handle(cx).await {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Done(response)) => return self.finish(cx, response).await,
                Err(err) => {
                    warn!(path = %cx.path(), error = %err, "middleware failed");
                    failure = Some(err);
                    break;
                }
            }
        }

        let err = match failure {
            Some(err) => err,
            None => {
                let response = HttpResponse::NotFound()
                    .content_type("text/plain; charset=utf-8")
                    .body("not found");
                return self.finish(cx, response).await;
            }
        };

        for error_entry in &error_entries {
            if let Some(response) = error_entry.handle_error(cx, &err).await {
                return self.finish(cx, response).await;
            }
        }

        // No error entry produced a response. The framework error middleware
        // always responds, so this path only exists for hand-built pipelines.
        let response = HttpResponse::InternalServerError()
            .content_type("text/plain; charset=utf-8")
            .body("internal server error");
        self.finish(cx, response).await
    }

    async fn finish(&self, cx: &mut RequestCx, mut response: HttpResponse) -> HttpResponse {
        for transform in cx.take_transforms() {
            response = transform.transform(cx, response).await;
        }
        response
    }
}
