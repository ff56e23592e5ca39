//! Shared utilities
//!
//! Error types and small network helpers used across the server core.

pub mod error;
pub mod net;

pub use error::{Result, ServerError};
