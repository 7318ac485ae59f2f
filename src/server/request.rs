//! HTTP/1.1 request parsing using the [`httparse`] crate
//!
//! The gateway's surface is two POST routes, so only the fields the router
//! needs are retained: method, path, content length and keep-alive intent.
//! The body is sliced off the connection buffer by the server once it has
//! fully arrived.

use thiserror::Error;

/// Errors that can occur while parsing an HTTP/1.1 request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is incomplete, more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// A parsed HTTP/1.1 request head.
#[derive(Debug)]
pub struct Request {
    method: String,
    path: String,
    /// HTTP minor version: 0 for HTTP/1.0, 1 for HTTP/1.1.
    version: u8,
    content_length: Option<usize>,
    connection: Option<String>,
}

impl Request {
    /// Maximum number of headers we accept per request.
    const MAX_HEADERS: usize = 64;

    /// Parse a request head from a raw byte buffer.
    ///
    /// Returns the parsed head and the byte offset at which the body begins
    /// (immediately after the `\r\n\r\n` header terminator).
    ///
    /// # Errors
    ///
    /// - [`RequestError::Incomplete`] if the headers have not fully arrived.
    /// - [`RequestError::Parse`] if the data is malformed.
    /// - [`RequestError::MissingField`] if method, path or version is absent.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), RequestError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw = httparse::Request::new(&mut headers);

        let body_offset = match raw.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(RequestError::Incomplete),
        };

        let method = raw
            .method
            .ok_or(RequestError::MissingField { field: "method" })?
            .to_string();
        let path = raw
            .path
            .ok_or(RequestError::MissingField { field: "path" })?
            .to_string();
        let version = raw
            .version
            .ok_or(RequestError::MissingField { field: "version" })?;

        let mut content_length = None;
        let mut connection = None;
        for header in raw.headers.iter() {
            if header.name.eq_ignore_ascii_case("content-length") {
                content_length = std::str::from_utf8(header.value)
                    .ok()
                    .and_then(|v| v.trim().parse().ok());
            } else if header.name.eq_ignore_ascii_case("connection") {
                connection = std::str::from_utf8(header.value).ok().map(str::to_owned);
            }
        }

        Ok((
            Self {
                method,
                path,
                version,
                content_length,
                connection,
            },
            body_offset,
        ))
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the value of the `Content-Length` header, if present.
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    /// Returns `true` if the connection should be kept alive after this
    /// request. HTTP/1.1 defaults to keep-alive.
    pub fn is_keep_alive(&self) -> bool {
        match self.connection.as_deref() {
            Some(conn) => conn.eq_ignore_ascii_case("keep-alive"),
            None => self.version == 1,
        }
    }
}
