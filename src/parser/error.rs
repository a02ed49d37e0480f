//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur during HTTP request parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The method token contains characters that are not allowed in a token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request path is invalid or missing.
    #[error("Invalid HTTP path")]
    InvalidPath,

    /// The request line is malformed (wrong format or missing components).
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The HTTP version in the request is not supported.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header in the request has an invalid format.
    #[error("Invalid header format")]
    InvalidHeaderFormat,

    /// The request is empty.
    #[error("Empty request")]
    EmptyRequest,

    /// The input ends before the request is complete.
    #[error("Incomplete request")]
    Incomplete,

    /// The Content-Length header is not a valid length, or repeated values disagree.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// A transfer coding other than chunked is the final coding.
    #[error("Unsupported Transfer-Encoding: {0}")]
    UnsupportedTransferEncoding(String),

    /// Both Transfer-Encoding and Content-Length are present.
    #[error("Request carries both Transfer-Encoding and Content-Length")]
    ConflictingFraming,

    /// A chunk header or chunk terminator is malformed.
    #[error("Malformed chunked body: {0}")]
    InvalidChunk(String),

    /// The request line and headers exceed the configured limit.
    #[error("Request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    /// The request body exceeds the configured limit.
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),
}
