//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::parser::Limits;
use crate::server::error::Error;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size.
    pub read_buffer_size: usize,
    /// The maximum size of a request line plus headers.
    pub max_head_size: usize,
    /// The maximum size of a decoded request body.
    pub max_body_size: usize,
    /// How long a keep-alive connection may sit without a new request.
    pub idle_timeout: Duration,
    /// How long a partially received request may stall between reads.
    pub read_timeout: Duration,
    /// Log method, path and body size of every request.
    pub log_requests: bool,
}

impl ServerConfig {
    /// Parser limits derived from this configuration.
    pub fn limits(&self) -> Limits {
        Limits {
            max_head_size: self.max_head_size,
            max_body_size: self.max_body_size,
        }
    }

    /// Reject settings the server cannot run with.
    ///
    /// Called by [`HttpServer::bind`](crate::server::HttpServer::bind) before
    /// the socket is opened.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_connections == 0 || self.max_connections > Semaphore::MAX_PERMITS {
            return Err(Error::InvalidConfig(format!(
                "max_connections must be between 1 and {}, got {}",
                Semaphore::MAX_PERMITS,
                self.max_connections
            )));
        }
        if self.read_buffer_size == 0 {
            return Err(Error::InvalidConfig("read_buffer_size must be at least 1".to_string()));
        }
        if self.max_head_size == 0 {
            return Err(Error::InvalidConfig("max_head_size must be at least 1".to_string()));
        }
        if self.idle_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(Error::InvalidConfig("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Upper bound on buffered bytes for one request, allowing for chunk framing overhead.
    pub(crate) fn max_buffered(&self) -> usize {
        self.max_head_size
            .saturating_mul(2)
            .saturating_add(self.max_body_size.saturating_mul(2))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_connections: 1024,
            read_buffer_size: 8192,
            max_head_size: limits.max_head_size,
            max_body_size: limits.max_body_size,
            idle_timeout: Duration::from_secs(60),
            read_timeout: Duration::from_secs(30),
            log_requests: false,
        }
    }
}
