//! Per-connection request loop.

use std::fmt;
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::parser::{parse_message, Error as ParserError, HttpVersion, Method, ParseStatus};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::Router;
use crate::server::response::{HttpResponse, StatusCode};

/// Where a connection is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for the first byte of the next request.
    Idle,
    /// Part of a request has been received.
    ReadingRequest,
    /// A full request is being handled.
    Dispatching,
    /// The response is being written.
    WritingResponse,
    /// The connection is finished.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One client connection served until it closes.
///
/// Requests are read from a single buffer, so pipelined requests are
/// answered one after another in arrival order.
pub struct Connection<'a, S> {
    stream: &'a mut S,
    router: &'a Router,
    config: &'a ServerConfig,
    buffer: Vec<u8>,
    state: ConnectionState,
}

impl<'a, S> Connection<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: &'a mut S, router: &'a Router, config: &'a ServerConfig) -> Self {
        Self {
            stream,
            router,
            config,
            buffer: Vec::with_capacity(config.read_buffer_size),
            state: ConnectionState::Idle,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        trace!("Connection state {} -> {next}", self.state);
        self.state = next;
    }

    /// Serve requests until the client or the protocol closes the connection.
    ///
    /// Returns `Ok(())` on an orderly close. Parse errors are answered with a
    /// 4xx response before the error is returned.
    pub async fn run(mut self) -> Result<(), Error> {
        let result = self.serve_requests().await;
        self.transition(ConnectionState::Closed);
        result
    }

    async fn serve_requests(&mut self) -> Result<(), Error> {
        let limits = self.config.limits();

        loop {
            match parse_message(&self.buffer, &limits) {
                Ok(ParseStatus::Complete(request, consumed)) => {
                    self.buffer.drain(..consumed);
                    self.transition(ConnectionState::Dispatching);

                    let keep_alive = request.keep_alive();
                    let is_head = request.method == Method::HEAD;
                    let version = request.version;

                    if self.config.log_requests {
                        info!(
                            "request method={} path={} content_length={:?} body_bytes={}",
                            request.method,
                            request.path,
                            request.content_length,
                            request.body.len()
                        );
                    }

                    let mut response = self.router.dispatch(request).await;
                    if !keep_alive {
                        response = response.with_header("Connection", "close");
                    } else if version == HttpVersion::Http10 {
                        response = response.with_header("Connection", "keep-alive");
                    }

                    self.transition(ConnectionState::WritingResponse);
                    self.write_response(&response, !is_head).await?;

                    if !keep_alive {
                        return Ok(());
                    }
                    self.transition(if self.has_pending_request() {
                        ConnectionState::ReadingRequest
                    } else {
                        ConnectionState::Idle
                    });
                }
                Ok(ParseStatus::Partial) => {
                    if self.buffer.len() > self.config.max_buffered() {
                        let e = ParserError::BodyTooLarge(self.config.max_body_size);
                        return self.reject(e).await;
                    }
                    if !self.fill_buffer().await? {
                        return self.finish_at_eof();
                    }
                }
                Err(e) => return self.reject(e).await,
            }
        }
    }

    /// Read more bytes. Returns `false` when the peer has closed or the
    /// idle timeout passed with nothing buffered.
    async fn fill_buffer(&mut self) -> Result<bool, Error> {
        let waiting_for_new_request = self.state == ConnectionState::Idle;
        let limit: Duration = if waiting_for_new_request {
            self.config.idle_timeout
        } else {
            self.config.read_timeout
        };

        let mut chunk = vec![0; self.config.read_buffer_size];
        let read = timeout(limit, self.stream.read(&mut chunk)).await;
        let n = match read {
            Ok(read) => read?,
            Err(_) if waiting_for_new_request && !self.has_pending_request() => {
                debug!("Closing idle connection after {limit:?}");
                return Ok(false);
            }
            Err(_) => {
                let response = HttpResponse::new(StatusCode::RequestTimeout).with_header("Connection", "close");
                // Best effort; the client may already be gone.
                let _ = self.write_response(&response, true).await;
                return Err(Error::Timeout);
            }
        };

        if n == 0 {
            return Ok(false);
        }
        self.buffer.extend_from_slice(&chunk[..n]);
        if self.state == ConnectionState::Idle && self.has_pending_request() {
            self.transition(ConnectionState::ReadingRequest);
        }
        Ok(true)
    }

    /// Whether the buffer holds anything besides the blank lines clients may
    /// send between requests.
    fn has_pending_request(&self) -> bool {
        self.buffer.iter().any(|b| !matches!(b, b'\r' | b'\n'))
    }

    fn finish_at_eof(&self) -> Result<(), Error> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            debug!("Peer closed connection");
            Ok(())
        } else {
            Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed in the middle of a request",
            )))
        }
    }

    /// Answer a request that could not be parsed, then close.
    async fn reject(&mut self, e: ParserError) -> Result<(), Error> {
        warn!("Rejecting malformed request: {e}");
        let status = match e {
            ParserError::HeadTooLarge(_) => StatusCode::RequestHeaderFieldsTooLarge,
            ParserError::BodyTooLarge(_) => StatusCode::PayloadTooLarge,
            ParserError::UnsupportedTransferEncoding(_) => StatusCode::NotImplemented,
            _ => StatusCode::BadRequest,
        };
        let response = HttpResponse::new(status)
            .with_header("Connection", "close")
            .with_content_type("text/plain")
            .with_body_string(format!("Error parsing request: {e}"));

        self.transition(ConnectionState::WritingResponse);
        self.write_response(&response, true).await?;
        Err(Error::ParseError(e))
    }

    async fn write_response(&mut self, response: &HttpResponse, include_body: bool) -> Result<(), Error> {
        self.stream.write_all(&response.serialize(include_body)).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
