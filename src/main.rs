//! `hello-server` binary: serves `GET /hello` on a configurable address.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use log::error;

use hello_server::{hello, HttpServer, ServerConfig};

/// Minimal HTTP/1.1 server answering `GET /hello`.
#[derive(Debug, Parser)]
#[command(name = "hello-server", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "HELLO_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Maximum number of concurrent connections.
    #[arg(long, env = "HELLO_MAX_CONNECTIONS", default_value_t = 1024)]
    max_connections: usize,

    /// Socket read buffer size in bytes.
    #[arg(long, env = "HELLO_READ_BUFFER_SIZE", default_value_t = 8192)]
    read_buffer_size: usize,

    /// Maximum size of the request line and headers in bytes.
    #[arg(long, env = "HELLO_MAX_HEAD_SIZE", default_value_t = 16 * 1024)]
    max_head_size: usize,

    /// Maximum size of a request body in bytes.
    #[arg(long, env = "HELLO_MAX_BODY_SIZE", default_value_t = 1024 * 1024)]
    max_body_size: usize,

    /// Seconds an idle keep-alive connection stays open.
    #[arg(long, env = "HELLO_IDLE_TIMEOUT", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    idle_timeout: u64,

    /// Seconds a partially received request may stall.
    #[arg(long, env = "HELLO_READ_TIMEOUT", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    read_timeout: u64,

    /// Log method, path and content length of every request.
    #[arg(long, env = "HELLO_LOG_REQUESTS")]
    log_requests: bool,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            addr: args.addr,
            max_connections: args.max_connections,
            read_buffer_size: args.read_buffer_size,
            max_head_size: args.max_head_size,
            max_body_size: args.max_body_size,
            idle_timeout: Duration::from_secs(args.idle_timeout),
            read_timeout: Duration::from_secs(args.read_timeout),
            log_requests: args.log_requests,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from(Args::parse());
    let router = hello::routes()?;

    // Only startup failures come back from `start`.
    if let Err(e) = HttpServer::new(config, router).start().await {
        error!("{e}");
        return Err(e.into());
    }
    Ok(())
}
