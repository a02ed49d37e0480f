//! HTTP server implementation for hello-server.
//!
//! Accepts connections, runs one task per connection, and dispatches every
//! parsed request through an exact-match [`Router`].

mod response;
mod config;
mod connection;
mod error;
mod handler;
mod http_server;

// Re-export public items
pub use response::{HttpResponse, StatusCode, SERVER_NAME};
pub use config::ServerConfig;
pub use connection::Connection;
pub use error::Error;
pub use handler::{HandlerFn, HandlerFuture, Router};
pub use http_server::{serve, HttpServer};
