//! HTTP/1.1 Request Parser
//!
//! An incremental parser for the small slice of HTTP/1.1 the server speaks.
//! TCP is a stream protocol: a single read may hold half a request or a
//! request plus trailing bytes, so the parser works like the rest of the
//! ecosystem's incremental parsers:
//!
//! - `Ok(Some((request, consumed)))` - a full request; `consumed` bytes of
//!   the buffer were used
//! - `Ok(None)` - incomplete; the caller should read more and retry
//! - `Err(ParseError)` - malformed or oversized input
//!
//! ## What is parsed
//!
//! Request line (`METHOD path HTTP/x.y`), header lines up to the blank
//! line, then `Content-Length` bytes of body. Header names are stored
//! lowercased for case-insensitive lookup; header lines without a colon are
//! skipped. A missing `Content-Length` means an empty body.

use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

/// Maximum size of the request head (request line + headers).
pub const MAX_HEAD_SIZE: usize = 8 * 1024;

/// Maximum accepted `Content-Length`.
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// The HTTP methods the server routes on.
///
/// Anything else parses as `Unknown` and falls through the router to a 404;
/// an unrecognized method is not a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Delete,
    Unknown,
}

impl HttpMethod {
    /// Maps a request-line token to a method.
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => HttpMethod::Get,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Unknown,
        }
    }
}

/// Errors from [`HttpRequest::parse`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request line did not split into method, path, and version
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// The head contained bytes that are not valid UTF-8
    #[error("invalid UTF-8 in request head")]
    InvalidUtf8,

    /// `Content-Length` was present but not a number
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    /// Head grew past [`MAX_HEAD_SIZE`] without a terminating blank line
    #[error("request head too large: {size} bytes (max: {max})")]
    HeadTooLarge { size: usize, max: usize },

    /// Declared body length exceeds [`MAX_BODY_SIZE`]
    #[error("request body too large: {size} bytes (max: {max})")]
    BodyTooLarge { size: usize, max: usize },
}

/// A parsed HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: HttpMethod,
    path: String,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl HttpRequest {
    /// Attempts to parse one request from the front of `buf`.
    ///
    /// See the module docs for the three-way result contract.
    pub fn parse(buf: &[u8]) -> Result<Option<(HttpRequest, usize)>, ParseError> {
        let Some((head_len, terminator_len)) = find_head_end(buf) else {
            if buf.len() > MAX_HEAD_SIZE {
                return Err(ParseError::HeadTooLarge {
                    size: buf.len(),
                    max: MAX_HEAD_SIZE,
                });
            }
            return Ok(None);
        };

        let head = std::str::from_utf8(&buf[..head_len]).map_err(|_| ParseError::InvalidUtf8)?;
        let mut lines = head.lines();

        // Request line: "GET /kv/hello HTTP/1.1"
        let request_line = lines.next().unwrap_or("");
        let mut parts = request_line.split_whitespace();
        let (method_token, path) = match (parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(path), Some(_version)) => (method, path),
            _ => return Err(ParseError::MalformedRequestLine(request_line.to_string())),
        };

        // Header lines: "Name: value"; names lowercased, colon-less lines skipped
        let mut headers = HashMap::new();
        for line in lines {
            let Some(colon) = line.find(':') else {
                continue;
            };
            let name = line[..colon].trim().to_ascii_lowercase();
            let value = line[colon + 1..].trim().to_string();
            headers.insert(name, value);
        }

        let body_len = match headers.get("content-length") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(raw.clone()))?,
            None => 0,
        };

        if body_len > MAX_BODY_SIZE {
            return Err(ParseError::BodyTooLarge {
                size: body_len,
                max: MAX_BODY_SIZE,
            });
        }

        let body_start = head_len + terminator_len;
        let total = body_start + body_len;
        if buf.len() < total {
            return Ok(None);
        }

        let request = HttpRequest {
            method: HttpMethod::from_token(method_token),
            path: path.to_string(),
            headers,
            body: Bytes::copy_from_slice(&buf[body_start..total]),
        };

        Ok(Some((request, total)))
    }

    /// The request method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The request path, e.g. `/kv/hello`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Locates the blank line ending the request head.
///
/// # Returns
///
/// Returns `(head_length, terminator_length)`. Standard `\r\n\r\n` and the
/// tolerated bare `\n\n` are both accepted, whichever comes first.
fn find_head_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (p, 4));
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
