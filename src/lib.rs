//! # renderd
//!
//! The request-serving core of a server-side-rendering framework: an
//! ordered middleware pipeline, socket lifecycle management, and the
//! lifecycle hooks host applications extend it through.
//!
//! ## Features
//!
//! - **Ordered pipeline**: connect-style middleware dispatched strictly in
//!   registration order, with path-scoped mounts
//! - **Named middleware**: string-identified modules resolved at startup;
//!   an unresolvable name never reaches a bound socket
//! - **Pluggable rendering**: the server drives an injected [`Renderer`]
//!   rather than rendering pages itself
//! - **Lifecycle hooks**: async subscribers on `render:*`, `listen`, and
//!   `close`, awaited sequentially
//! - **TCP, TLS, and Unix sockets**: rustls-backed HTTPS and Unix domain
//!   socket binding with forced-destroy shutdown
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use renderd::server::ServerBuilder;
//! use renderd::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/renderd.yaml").await?;
//!     let server = ServerBuilder::new().with_config(config).build();
//!     server.ready().await?;
//!     let listener = server.listen().await?;
//!     println!("listening on {}", listener.display_url());
//!     tokio::signal::ctrl_c().await?;
//!     server.close().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod hooks;
pub mod middleware;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod resources;
pub mod server;
pub mod utils;

pub use config::Config;
pub use hooks::{HookBus, HookPayload};
pub use pipeline::{Middleware, Pipeline};
pub use render::{RenderContext, RenderedRoute, Renderer};
pub use resolver::{ModuleResolver, StaticResolver};
pub use resources::{Resource, ResourceRegistry};
pub use server::{Listener, Server, ServerBuilder};
pub use utils::error::{Result, ServerError};
