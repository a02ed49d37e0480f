//! A minimal HTTP/1.1 server.
//!
//! The server binds one address, parses HTTP/1.1 requests (keep-alive,
//! pipelining, `Content-Length` and chunked bodies), and dispatches each
//! request through an exact-match route table. The bundled application
//! answers `GET /hello`; every other method and path gets a 404.
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use hello_server::{parse_request, Method};
//!
//! let request_bytes = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! let request = parse_request(request_bytes).unwrap();
//! assert_eq!(request.method, Method::GET);
//! assert_eq!(request.path, "/hello");
//! ```
//!
//! ## Building a route table
//!
//! ```
//! use hello_server::{HttpResponse, Method, Router, StatusCode};
//!
//! let router = Router::new()
//!     .route(Method::GET, "/ping", |_req| async {
//!         Ok(HttpResponse::new(StatusCode::Ok).with_body_string("pong"))
//!     })
//!     .unwrap();
//!
//! assert!(router.lookup(&Method::GET, "/ping").is_some());
//! assert!(router.lookup(&Method::POST, "/ping").is_none());
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! # async fn run() -> Result<(), hello_server::ServerError> {
//! let router = hello_server::hello::routes()?;
//! hello_server::serve("127.0.0.1:8080", router).await?;
//! # Ok(())
//! # }
//! ```

pub mod hello;

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{Error as ServerError, HttpResponse, HttpServer, Router, ServerConfig, StatusCode, serve};
