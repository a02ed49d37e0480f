//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;

use crate::parser::body::BodyFraming;
use crate::parser::error::Error;
use crate::parser::method::{is_token_char, Method};
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target, including any query string
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers. The parser stores names lowercased.
    pub headers: HashMap<String, String>,
    /// The request body, already de-chunked
    pub body: Vec<u8>,
    /// The declared body length. `None` when the body was sent chunked.
    pub content_length: Option<usize>,
    /// Query parameters parsed from the path
    pub query_params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a new HTTP request.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method
    /// * `path` - The request path
    /// * `version` - The HTTP version
    /// * `headers` - The HTTP headers
    ///
    /// # Returns
    ///
    /// A new HTTP request with an empty body
    pub fn new(method: Method, path: String, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        // Parse query parameters from the path
        let query_params: HashMap<String, String> = path
            .split_once('?')
            .map(|(_, query)| query
                .split('&')
                .filter(|s| !s.is_empty())
                .map(|pair| {
                    if let Some((k, v)) = pair.split_once('=') {
                        (k.to_string(), v.to_string())
                    } else {
                        (pair.to_string(), String::new())
                    }
                })
                .collect())
            .unwrap_or_default();

        Self {
            method,
            path,
            version,
            headers,
            body: Vec::new(),
            content_length: Some(0),
            query_params,
        }
    }

    /// Get a header value, ignoring the case of `name`.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The path used for routing: the request target without its query string.
    pub fn route_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// Whether the client wants the connection kept open after this request.
    ///
    /// `Connection: close` always wins. Otherwise HTTP/1.1 stays open and
    /// HTTP/1.0 stays open only with `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        let has_token = |token: &str| {
            self.get_header("Connection")
                .is_some_and(|value| value.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
        };

        if has_token("close") {
            false
        } else if self.version.keep_alive_by_default() {
            true
        } else {
            has_token("keep-alive")
        }
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if a query parameter exists.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }
}

/// Size limits applied while parsing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of the request line plus headers, in bytes.
    pub max_head_size: usize,
    /// Maximum size of the decoded body, in bytes.
    pub max_body_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_head_size: 16 * 1024,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Outcome of feeding buffered bytes to [`parse_message`].
#[derive(Debug)]
pub enum ParseStatus {
    /// More bytes are needed before a full request is available.
    Partial,
    /// A full request, and the number of input bytes it occupied.
    Complete(HttpRequest, usize),
}

/// Parse one HTTP request from the start of `input`.
///
/// Bytes after the returned length belong to the next pipelined request.
/// Errors are reported as soon as the bytes seen so far cannot start a
/// valid request, even if the head is not complete yet.
pub fn parse_message(input: &[u8], limits: &Limits) -> Result<ParseStatus, Error> {
    // Clients may send stray line breaks between requests.
    let start = skip_empty_lines(input);
    let buf = &input[start..];

    let head_end = match find_head_end(buf) {
        Some(end) => end,
        None => {
            if buf.len() > limits.max_head_size {
                return Err(Error::HeadTooLarge(limits.max_head_size));
            }
            if let Some(line_end) = buf.iter().position(|&b| b == b'\n') {
                let line = head_str(&buf[..line_end])?;
                parse_request_line(line.trim_end_matches('\r'))?;
            }
            return Ok(ParseStatus::Partial);
        }
    };

    if head_end > limits.max_head_size {
        return Err(Error::HeadTooLarge(limits.max_head_size));
    }

    let head = head_str(&buf[..head_end])?;
    let mut lines = head.lines();

    let request_line = lines.next().ok_or(Error::EmptyRequest)?;
    let (method, path, version) = parse_request_line(request_line)?;
    let headers = parse_headers(lines)?;

    // Check for required headers
    if version == HttpVersion::Http11 && !headers.contains_key("host") {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let framing = BodyFraming::from_headers(&headers)?;
    let body_start = start + head_end;
    let (body, body_len) = match framing.decode(&input[body_start..], limits.max_body_size)? {
        Some(decoded) => decoded,
        None => return Ok(ParseStatus::Partial),
    };

    let mut request = HttpRequest::new(method, path, version, headers);
    request.content_length = framing.content_length();
    request.body = body;

    Ok(ParseStatus::Complete(request, body_start + body_len))
}

/// Parse an HTTP request from a byte slice that holds the whole request.
///
/// # Arguments
///
/// * `input` - A byte slice containing the HTTP request to parse
///
/// # Returns
///
/// The parsed HTTP request, or an error if the request is invalid or incomplete
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    match parse_message(input, &Limits::default())? {
        ParseStatus::Complete(request, _) => Ok(request),
        ParseStatus::Partial if input.iter().all(u8::is_ascii_whitespace) => Err(Error::EmptyRequest),
        ParseStatus::Partial => Err(Error::Incomplete),
    }
}

fn head_str(bytes: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(bytes).map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))
}

fn skip_empty_lines(input: &[u8]) -> usize {
    let mut pos = 0;
    loop {
        match &input[pos..] {
            [b'\r', b'\n', ..] => pos += 2,
            [b'\n', ..] => pos += 1,
            _ => return pos,
        }
    }
}

/// Offset just past the blank line that ends the head. Accepts CRLF and bare LF.
fn find_head_end(buf: &[u8]) -> Option<usize> {
    let mut from = 0;
    while let Some(offset) = buf[from..].iter().position(|&b| b == b'\n') {
        let newline = from + offset;
        match &buf[newline + 1..] {
            [b'\n', ..] => return Some(newline + 2),
            [b'\r', b'\n', ..] => return Some(newline + 3),
            _ => from = newline + 1,
        }
    }
    None
}

fn parse_request_line(line: &str) -> Result<(Method, String, HttpVersion), Error> {
    // Exactly one space between the three parts.
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let path = parts[1].to_string();
    if path.is_empty() {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    Ok((method, path, version))
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Result<HashMap<String, String>, Error> {
    let mut headers: HashMap<String, String> = HashMap::new();
    for line in lines {
        // Empty line indicates the end of headers
        if line.is_empty() {
            break;
        }

        // Obsolete line folding is not accepted.
        if line.starts_with([' ', '\t']) {
            return Err(Error::InvalidHeaderFormat);
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        if name.is_empty() || !name.chars().all(is_token_char) {
            return Err(Error::InvalidHeaderFormat);
        }

        let value = value.trim();
        headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    Ok(headers)
}
