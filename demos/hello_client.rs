//! A raw TCP client that sends `GET /hello` and prints the raw response.
//!
//! Start the server first (`cargo run`), then:
//!
//! ```text
//! cargo run --example hello_client -- 127.0.0.1:8080
//! ```

use log::info;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let target = std::env::args().nth(1).unwrap_or_else(|| "127.0.0.1:8080".to_string());

    let headers = [
        ("Host", target.as_str()),
        ("Accept-Language", "en"),
        ("User-Agent", "hello-client/0.1"),
        ("Accept", "*/*"),
        ("Connection", "close"),
    ];
    let mut request = String::from("GET /hello HTTP/1.1\r\n");
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str("\r\n");

    info!("Sending to {target}");
    let mut stream = TcpStream::connect(&target).await?;
    stream.write_all(request.as_bytes()).await?;
    info!("Bytes sent: {}", request.len());

    // The request asks the server to close, so read until EOF.
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    info!("Bytes received: {}", response.len());

    println!("{}", String::from_utf8_lossy(&response));
    Ok(())
}
