//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The listening socket could not be bound. Fatal at startup.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The bind address did not resolve to any socket address.
    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The route table handed to the server has no routes.
    #[error("Route table is empty")]
    EmptyRouteTable,

    /// A handler is already registered for this method and path.
    #[error("Duplicate route: {0} {1}")]
    DuplicateRoute(Method, String),

    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The client stopped sending in the middle of a request.
    #[error("Timed out reading request")]
    Timeout,

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),
}
