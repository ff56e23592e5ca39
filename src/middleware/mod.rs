//! Built-in pipeline stages
//!
//! One module per fixed pipeline phase: compression, modern-bundle
//! negotiation, dev-bundle dispatch, the open-in-editor endpoint, static
//! assets, rendering, and the terminal error middleware.

pub mod compression;
pub mod dev;
pub mod editor;
pub mod error;
pub mod modern;
pub mod render;
pub mod static_files;

pub use compression::Compression;
pub use dev::{BundleTarget, DevHandlers, DevMiddleware};
pub use editor::OpenInEditor;
pub use error::ErrorMiddleware;
pub use modern::ModernNegotiation;
pub use render::RenderMiddleware;
pub use static_files::ServeStatic;
