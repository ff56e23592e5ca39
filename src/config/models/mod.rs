//! Configuration model definitions

pub mod app;
pub mod render;
pub mod server;

pub use app::{BuildConfig, DirsConfig, RouterConfig};
pub use render::{ModernMode, RenderConfig, ServerMiddlewareConfig};
pub use server::{HttpsConfig, ServerConfig, TlsFiles};
