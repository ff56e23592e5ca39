//! Ordered, path-scoped middleware pipeline
//!
//! Requests flow through registered handlers strictly in registration order;
//! a handler either passes the request on or finishes it with a response.
//! Failures short-circuit to the error handlers at the tail of the pipeline.

pub mod entry;
pub mod handler;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use entry::{normalize_path, path_matches, Middleware, MiddlewareEntry, MiddlewareSource};
pub use handler::{handler_fn, ErrorHandler, Handler, Outcome, RequestCx, ResponseTransform};
pub use pipeline::Pipeline;
