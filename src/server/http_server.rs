//! HTTP server implementation.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use log::{debug, error, info, warn};

use crate::server::config::ServerConfig;
use crate::server::connection::Connection;
use crate::server::error::Error;
use crate::server::handler::Router;
use crate::server::response::{HttpResponse, StatusCode};

/// Bind `addr` and serve `router` on it forever.
///
/// Only returns on startup failure: an empty route table, an address that
/// does not resolve, or a socket that cannot be bound.
pub async fn serve(addr: &str, router: Router) -> Result<Infallible, Error> {
    let addr = tokio::net::lookup_host(addr)
        .await
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| Error::InvalidAddress(addr.to_string()))?;

    let config = ServerConfig {
        addr,
        ..ServerConfig::default()
    };
    HttpServer::new(config, router).start().await
}

/// An HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The route table, read-only once the server exists.
    router: Arc<Router>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and routes.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
        }
    }

    /// Bind the TCP listener.
    pub async fn bind(&self) -> Result<TcpListener, Error> {
        self.config.validate()?;
        if self.router.is_empty() {
            return Err(Error::EmptyRouteTable);
        }
        let listener = TcpListener::bind(self.config.addr)
            .await
            .map_err(|source| Error::Bind {
                addr: self.config.addr.to_string(),
                source,
            })?;
        let local_addr = listener.local_addr().unwrap_or(self.config.addr);
        info!("Server listening on http://{local_addr}");
        Ok(listener)
    }

    /// Bind and serve. Never returns on success.
    pub async fn start(self) -> Result<Infallible, Error> {
        let listener = self.bind().await?;
        self.router.log_endpoints();
        self.run(listener).await
    }

    /// Accept connections on an already bound listener, one task per connection.
    pub async fn run(self, listener: TcpListener) -> Result<Infallible, Error> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let config = Arc::new(self.config);

        loop {
            match listener.accept().await {
                Ok((socket, addr)) => {
                    Self::handle_new_connection(
                        socket,
                        addr,
                        semaphore.clone(),
                        self.router.clone(),
                        config.clone(),
                    );
                }
                Err(e) => Self::handle_accept_error(e).await,
            }
        }
    }

    /// Spawn a task for a new connection, or turn it away when at capacity.
    fn handle_new_connection(
        mut socket: TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        router: Arc<Router>,
        config: Arc<ServerConfig>,
    ) {
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                // Written off the accept loop so a slow client cannot stall it.
                tokio::spawn(Self::reject_at_capacity(socket));
                return;
            }
        };

        debug!("Accepted connection from {addr}");
        tokio::spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &router, &config).await {
                warn!("Connection from {addr} closed with error: {e}");
            }
            let _ = socket.shutdown().await;
        });
    }

    async fn reject_at_capacity(mut socket: TcpStream) {
        let response = HttpResponse::new(StatusCode::ServiceUnavailable)
            .with_header("Connection", "close")
            .with_content_type("text/plain")
            .with_body_string("Server is at capacity, please try again later");
        let _ = socket.write_all(&response.to_bytes()).await;
        let _ = socket.shutdown().await;
    }

    /// Accept failures are usually transient (e.g. out of file descriptors).
    async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    /// Handle a single connection until it closes.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: &Router,
        config: &ServerConfig,
    ) -> Result<(), Error> {
        Connection::new(socket, router, config).run().await
    }
}
