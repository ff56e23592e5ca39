//! Handler traits and per-request context

use crate::utils::error::{Result, ServerError};
use actix_web::http::header::HeaderMap;
use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::LocalBoxFuture;
use std::sync::Arc;

/// What a pipeline stage decided about the request.
#[derive(Debug)]
pub enum Outcome {
    /// Pass the request to the next matching stage
    Continue,
    /// The request is finished with this response
    Done(HttpResponse),
}

// The handler traits are `?Send`: `HttpRequest` and `HttpResponse` are
// `Rc`-backed, so futures holding a `RequestCx` or a response across an
// await never cross threads. Workers are single-threaded; only the handler
// objects themselves are shared, hence `Send + Sync` on the trait and
// thread-local futures on the methods.

/// One unit of request-processing logic.
#[async_trait(?Send)]
pub trait Handler: Send + Sync {
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome>;
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Handler")
    }
}

/// Terminal error-handling logic (the 4-argument middleware of the pipeline).
///
/// Returning `None` passes the error to the next error handler; the
/// framework's own error middleware always returns a response.
#[async_trait(?Send)]
pub trait ErrorHandler: Send + Sync {
    async fn handle_error(&self, cx: &mut RequestCx, err: &ServerError) -> Option<HttpResponse>;
}

/// A transformation applied to the final response, whoever produced it.
///
/// Stages register transforms on the request context (compression does);
/// the pipeline applies them in registration order before replying.
#[async_trait(?Send)]
pub trait ResponseTransform: Send + Sync {
    async fn transform(&self, cx: &RequestCx, response: HttpResponse) -> HttpResponse;
}

/// Per-request context handed down the pipeline.
pub struct RequestCx {
    request: HttpRequest,
    body: Bytes,
    mount: String,
    modern: bool,
    transforms: Vec<Arc<dyn ResponseTransform>>,
}

impl RequestCx {
    pub fn new(request: HttpRequest, body: Bytes) -> Self {
        Self {
            request,
            body,
            mount: "/".to_string(),
            modern: false,
            transforms: Vec::new(),
        }
    }

    /// The underlying HTTP request.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Full request path, independent of the current mount.
    pub fn path(&self) -> &str {
        self.request.path()
    }

    pub fn query_string(&self) -> &str {
        self.request.query_string()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Convenience accessor for a single header value as UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// Buffered request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Mount path of the stage currently handling the request.
    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub(crate) fn set_mount(&mut self, mount: String) {
        self.mount = mount;
    }

    /// Request path relative to the current mount, always starting with `/`.
    pub fn rest_path(&self) -> String {
        let mount = self.mount.trim_end_matches('/');
        let rest = self.path().strip_prefix(mount).unwrap_or(self.path());
        if rest.is_empty() {
            "/".to_string()
        } else {
            rest.to_string()
        }
    }

    /// Whether the client was negotiated onto the modern bundle.
    pub fn is_modern(&self) -> bool {
        self.modern
    }

    pub fn set_modern(&mut self, modern: bool) {
        self.modern = modern;
    }

    /// Queue a transform applied to the final response.
    pub fn add_transform(&mut self, transform: Arc<dyn ResponseTransform>) {
        self.transforms.push(transform);
    }

    pub(crate) fn take_transforms(&mut self) -> Vec<Arc<dyn ResponseTransform>> {
        std::mem::take(&mut self.transforms)
    }
}

struct HandlerFn<F>(F);

#[async_trait(?Send)]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut RequestCx) -> LocalBoxFuture<'a, Result<Outcome>> + Send + Sync,
{
    async fn handle(&self, cx: &mut RequestCx) -> Result<Outcome> {
        (self.0)(cx).await
    }
}

/// Wrap a closure as a pipeline handler.
///
/// ```ignore
/// let handler = handler_fn(|cx| {
///     Box::pin(async move { Ok(Outcome::Continue) })
/// });
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: for<'a> Fn(&'a mut RequestCx) -> LocalBoxFuture<'a, Result<Outcome>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(HandlerFn(f))
}
