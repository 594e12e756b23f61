//! Error types for mcp-server-store.
//!
//! Protocol-level errors live in [`crate::mcp::protocol::RpcError`]; the types
//! here cover configuration, logging control, and the boundary between method
//! handlers and the dispatcher.

use std::path::PathBuf;

use thiserror::Error;

use crate::mcp::protocol::RpcError;

/// Boxed error returned by tool, resource, and prompt handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised when changing the log level at runtime.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The installed subscriber rejected the new filter.
    #[error("failed to reload log filter: {0}")]
    Reload(#[from] tracing_subscriber::reload::Error),
}

/// Failure of a dispatcher method handler.
///
/// `Rpc` errors reach the client unchanged; anything else is reported as an
/// internal error.
#[derive(Error, Debug)]
pub enum MethodError {
    /// A protocol error with its own code.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl MethodError {
    /// Wraps an arbitrary error.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }

    /// Converts this error into the object sent on the wire.
    #[must_use]
    pub fn into_rpc_error(self) -> RpcError {
        match self {
            Self::Rpc(error) => error,
            Self::Other(error) => RpcError::internal("Internal error").with_data(error.to_string()),
        }
    }
}
