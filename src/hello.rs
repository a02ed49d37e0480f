//! The hello route.

use crate::parser::{HttpRequest, Method};
use crate::server::{Error, HttpResponse, Router, StatusCode};

/// Path served by [`hello`].
pub const HELLO_PATH: &str = "/hello";

/// Body written by [`hello`].
pub const HELLO_BODY: &str = "Hello, from the server!\n";

/// Answers every request with 200 and [`HELLO_BODY`].
///
/// The request headers and body are ignored, and no `Content-Type` is set.
pub async fn hello(_req: HttpRequest) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::new(StatusCode::Ok).with_body_string(HELLO_BODY))
}

/// The application's route table: `GET /hello` only.
pub fn routes() -> Result<Router, Error> {
    Router::new().route(Method::GET, HELLO_PATH, hello)
}
