//! HTTP/1.1 Response Builder
//!
//! Responses are built with named factories plus a chainable builder:
//!
//! ```
//! use hearthkv::http::HttpResponse;
//!
//! let response = HttpResponse::ok().body("Hello, World!");
//! let wire = response.build();
//! assert!(wire.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```
//!
//! `build()` always emits `Content-Length` (so the client knows where the
//! body ends) and `Connection: close` - the server handles one request per
//! connection and closes it afterwards.

use bytes::Bytes;

/// An HTTP response under construction.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status_code: u16,
    status_text: &'static str,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpResponse {
    fn with_status(status_code: u16, status_text: &'static str) -> Self {
        Self {
            status_code,
            status_text,
            // Plain-text default; header() replaces it if the caller sets
            // its own Content-Type
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: Bytes::new(),
        }
    }

    /// 200 OK
    pub fn ok() -> Self {
        Self::with_status(200, "OK")
    }

    /// 201 Created
    pub fn created() -> Self {
        Self::with_status(201, "Created")
    }

    /// 400 Bad Request
    pub fn bad_request() -> Self {
        Self::with_status(400, "Bad Request")
    }

    /// 404 Not Found
    pub fn not_found() -> Self {
        Self::with_status(404, "Not Found")
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed() -> Self {
        Self::with_status(405, "Method Not Allowed")
    }

    /// 500 Internal Server Error
    pub fn internal_error() -> Self {
        Self::with_status(500, "Internal Server Error")
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a response header, replacing any prior header of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();

        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            existing.1 = value;
        } else {
            self.headers.push((name, value));
        }
        self
    }

    /// The numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Serializes the response to its HTTP/1.1 wire form.
    ///
    /// ```text
    /// HTTP/1.1 200 OK\r\n
    /// Content-Length: 13\r\n
    /// Connection: close\r\n
    /// Content-Type: text/plain\r\n
    /// \r\n
    /// Hello, World!
    /// ```
    pub fn build(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(128 + self.body.len());

        wire.extend_from_slice(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status_code, self.status_text
            )
            .as_bytes(),
        );
        wire.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        wire.extend_from_slice(b"Connection: close\r\n");

        for (name, value) in &self.headers {
            wire.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        wire.extend_from_slice(b"\r\n");
        wire.extend_from_slice(&self.body);
        wire
    }
}
