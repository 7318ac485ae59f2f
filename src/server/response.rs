//! HTTP/1.1 response construction
//!
//! Responses come in two shapes: a buffered body sent with `Content-Length`,
//! and a streamed SSE body sent with `Transfer-Encoding: chunked` and fed by
//! a [`RelayStream`]. Serialization of the head is shared; the connection
//! handler writes streamed bodies frame by frame.

use bytes::{BufMut, BytesMut};

use crate::relay::RelayStream;

/// Response body: buffered or streamed.
pub enum Body {
    Full(Vec<u8>),
    Stream(RelayStream),
}

/// An HTTP/1.1 response.
pub struct Response {
    pub(crate) status: u16,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Body,
    pub(crate) keep_alive: bool,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Full(Vec::new()),
            keep_alive: true,
        }
    }

    /// Creates a JSON response with the given status.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(value).unwrap_or_default())
    }

    /// Creates a streaming SSE response fed by the relay.
    pub fn event_stream(stream: RelayStream) -> Self {
        let mut response = Self::new(200)
            .header("Content-Type", "text/event-stream")
            .header("Cache-Control", "no-cache");
        response.body = Body::Stream(stream);
        response
    }

    /// Appends a response header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a buffered response body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Full(body.into());
        self
    }

    /// Controls the `Connection` header written with the head.
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns `true` if the body is streamed.
    pub fn is_streaming(&self) -> bool {
        matches!(self.body, Body::Stream(_))
    }

    /// Serializes the response head using HTTP/1.1 wire format.
    ///
    /// Buffered bodies get a `Content-Length` header; streamed bodies get
    /// `Transfer-Encoding: chunked`. The `Connection` header reflects the
    /// keep-alive flag.
    pub(crate) fn head_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(128 + self.headers.len() * 64);

        buf.put(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status,
                canonical_reason(self.status)
            )
            .as_bytes(),
        );

        for (name, value) in &self.headers {
            buf.put(format!("{}: {}\r\n", name, value).as_bytes());
        }

        let connection = if self.keep_alive { "keep-alive" } else { "close" };
        buf.put(format!("Connection: {}\r\n", connection).as_bytes());

        match &self.body {
            Body::Full(body) => {
                buf.put(format!("Content-Length: {}\r\n", body.len()).as_bytes());
            }
            Body::Stream(_) => {
                buf.put(&b"Transfer-Encoding: chunked\r\n"[..]);
            }
        }

        buf.put(&b"\r\n"[..]);
        buf
    }
}

/// Reason phrase for the status codes the gateway emits, including passed
/// through upstream statuses.
fn canonical_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
