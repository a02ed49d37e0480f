//! HTTP/1.x request parser.
//!
//! Parses request lines, headers and bodies framed by `Content-Length` or
//! chunked transfer coding. The parser is incremental: it can be handed a
//! partially received buffer and reports whether a whole request is present.

mod body;
mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use request::{HttpRequest, Limits, ParseStatus};
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

// Re-export the parse functions
pub use request::{parse_message, parse_request};
