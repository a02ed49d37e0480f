//! Request body framing: `Content-Length` and chunked transfer coding.

use std::collections::HashMap;

use crate::parser::error::Error;

/// Longest chunk-size line accepted, extensions included.
const MAX_CHUNK_LINE: usize = 1024;

/// How the body of a request is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyFraming {
    /// No body.
    Empty,
    /// Exactly this many bytes follow the head.
    Length(usize),
    /// A sequence of chunks ending with a zero-size chunk and optional trailers.
    Chunked,
}

impl BodyFraming {
    /// Decide the framing from lowercased header names.
    pub(crate) fn from_headers(headers: &HashMap<String, String>) -> Result<Self, Error> {
        match (headers.get("transfer-encoding"), headers.get("content-length")) {
            (Some(_), Some(_)) => Err(Error::ConflictingFraming),
            (Some(coding), None) => {
                if coding.trim().eq_ignore_ascii_case("chunked") {
                    Ok(BodyFraming::Chunked)
                } else {
                    Err(Error::UnsupportedTransferEncoding(coding.clone()))
                }
            }
            (None, Some(value)) => parse_content_length(value).map(|len| match len {
                0 => BodyFraming::Empty,
                len => BodyFraming::Length(len),
            }),
            (None, None) => Ok(BodyFraming::Empty),
        }
    }

    /// The length a request with this framing reports. Chunked bodies have none up front.
    pub(crate) fn content_length(&self) -> Option<usize> {
        match self {
            BodyFraming::Empty => Some(0),
            BodyFraming::Length(len) => Some(*len),
            BodyFraming::Chunked => None,
        }
    }

    /// Decode the body at the start of `input`.
    ///
    /// Returns the body and the number of wire bytes it used, or `None`
    /// when `input` does not hold the whole body yet.
    pub(crate) fn decode(&self, input: &[u8], max_body_size: usize) -> Result<Option<(Vec<u8>, usize)>, Error> {
        match *self {
            BodyFraming::Empty => Ok(Some((Vec::new(), 0))),
            BodyFraming::Length(len) => {
                if len > max_body_size {
                    return Err(Error::BodyTooLarge(max_body_size));
                }
                if input.len() < len {
                    return Ok(None);
                }
                Ok(Some((input[..len].to_vec(), len)))
            }
            BodyFraming::Chunked => decode_chunked(input, max_body_size),
        }
    }
}

/// Repeated Content-Length headers arrive joined with commas and must all agree.
fn parse_content_length(value: &str) -> Result<usize, Error> {
    let mut length = None;
    for part in value.split(',').map(str::trim) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidContentLength(value.to_string()));
        }
        let parsed: usize = part
            .parse()
            .map_err(|_| Error::InvalidContentLength(value.to_string()))?;
        match length {
            Some(previous) if previous != parsed => {
                return Err(Error::InvalidContentLength(value.to_string()));
            }
            _ => length = Some(parsed),
        }
    }
    length.ok_or_else(|| Error::InvalidContentLength(value.to_string()))
}

/// Length of the line at the start of `buf` and the length of its terminator.
fn line_end(buf: &[u8]) -> Option<(usize, usize)> {
    let newline = buf.iter().position(|&b| b == b'\n')?;
    if newline > 0 && buf[newline - 1] == b'\r' {
        Some((newline - 1, 2))
    } else {
        Some((newline, 1))
    }
}

fn decode_chunked(input: &[u8], max_body_size: usize) -> Result<Option<(Vec<u8>, usize)>, Error> {
    let mut body = Vec::new();
    let mut pos = 0;

    loop {
        let Some((line_len, terminator)) = line_end(&input[pos..]) else {
            if input.len() - pos > MAX_CHUNK_LINE {
                return Err(Error::InvalidChunk("chunk size line too long".to_string()));
            }
            return Ok(None);
        };
        let size = parse_chunk_size(&input[pos..pos + line_len])?;
        pos += line_len + terminator;

        if size == 0 {
            // Trailer fields are read and discarded up to the closing blank line.
            loop {
                let Some((line_len, terminator)) = line_end(&input[pos..]) else {
                    return Ok(None);
                };
                pos += line_len + terminator;
                if line_len == 0 {
                    return Ok(Some((body, pos)));
                }
            }
        }

        if body.len().saturating_add(size) > max_body_size {
            return Err(Error::BodyTooLarge(max_body_size));
        }

        let data_end = pos + size;
        if input.len() < data_end {
            return Ok(None);
        }
        body.extend_from_slice(&input[pos..data_end]);

        pos = match &input[data_end..] {
            [b'\r', b'\n', ..] => data_end + 2,
            [b'\n', ..] => data_end + 1,
            [] | [b'\r'] => return Ok(None),
            _ => return Err(Error::InvalidChunk("missing line break after chunk data".to_string())),
        };
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, Error> {
    let line = std::str::from_utf8(line).map_err(|_| Error::InvalidChunk("invalid UTF-8 in chunk size".to_string()))?;
    // Chunk extensions follow a semicolon and are ignored.
    let digits = line.split(';').next().unwrap_or_default().trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidChunk(line.to_string()));
    }
    usize::from_str_radix(digits, 16).map_err(|_| Error::InvalidChunk(line.to_string()))
}
