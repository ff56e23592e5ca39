//! Error types for the server core
//!
//! Every failure surfaces either through a returned `Result` or through the
//! terminal error middleware at the end of the pipeline; nothing is dropped.

use actix_web::http::StatusCode;
use thiserror::Error;

/// Result type alias for the server core
pub type Result<T> = std::result::Result<T, ServerError>;

/// Main error type for the server core
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A string-named middleware could not be resolved at startup
    #[error("Failed to resolve middleware `{0}`")]
    Resolution(String),

    /// The listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Human-readable bind target
        addr: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// A non-error middleware failed during request handling
    #[error("Request error: {0}")]
    Request(String),

    /// The rendering collaborator failed to produce a page
    #[error("Render error: {0}")]
    Render(String),

    /// No middleware produced a response for the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// Forced connection destroy failed
    #[error("Shutdown error: {0}")]
    Shutdown(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ServerError {
    /// HTTP status the terminal error middleware reports for this error.
    ///
    /// Always a non-2xx status: a request that reaches the error stage must
    /// never be answered as a success.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Request(_)
            | ServerError::Render(_)
            | ServerError::Config(_)
            | ServerError::Resolution(_)
            | ServerError::Bind { .. }
            | ServerError::Shutdown(_)
            | ServerError::Io(_)
            | ServerError::Serialization(_)
            | ServerError::Yaml(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::Resolution(_) => "RESOLUTION_ERROR",
            ServerError::Bind { .. } => "BIND_ERROR",
            ServerError::Request(_) => "REQUEST_ERROR",
            ServerError::Render(_) => "RENDER_ERROR",
            ServerError::NotFound(_) => "NOT_FOUND",
            ServerError::Shutdown(_) => "SHUTDOWN_ERROR",
            ServerError::Io(_) => "IO_ERROR",
            ServerError::Serialization(_) => "SERIALIZATION_ERROR",
            ServerError::Yaml(_) => "YAML_ERROR",
        }
    }
}
