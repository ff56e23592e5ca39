//! Error handling for the server core

pub mod error;

pub use error::{Result, ServerError};
