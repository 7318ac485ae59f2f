//! Async HTTP server using Tokio
//!
//! Accepts TCP connections and dispatches HTTP/1.1 requests to the gateway
//! router. Persistent connections are supported; a streamed response is
//! written chunk by chunk as the relay produces frames. If the peer goes
//! away mid-stream the write fails, the connection task returns and the
//! relay stream is dropped, which cancels the upstream read.

mod request;
mod response;

pub use request::{Request, RequestError};
pub use response::{Body, Response};

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use serde_json::json;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::api::{self, AppState};

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Maximum size of a complete HTTP request we will buffer before rejecting it (1 MiB).
const MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// Initial read buffer capacity per connection.
const INITIAL_BUF_SIZE: usize = 4096;

/// The gateway HTTP server.
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Binds the server to the given TCP address.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(addr: impl AsRef<str>) -> Result<Self, ServerError> {
        let addr = addr.as_ref();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_owned(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts accepting connections and dispatching requests to the router.
    ///
    /// Runs until the process is terminated or the listener fails.
    pub async fn run(self, state: Arc<AppState>) -> Result<(), ServerError> {
        info!(address = %self.local_addr, "chat gateway listening");

        loop {
            let (stream, peer_addr) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    continue;
                }
            };

            debug!(peer = %peer_addr, "connection accepted");
            let state = Arc::clone(&state);

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer_addr, state).await {
                    warn!(peer = %peer_addr, error = %e, "connection closed with error");
                }
            });
        }
    }
}

/// Handles a single TCP connection over its lifetime, one request per
/// iteration until the peer closes or signals `Connection: close`.
async fn handle_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> io::Result<()> {
    let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);

    loop {
        let bytes_read = stream.read_buf(&mut buf).await?;

        if bytes_read == 0 {
            debug!(peer = %peer_addr, "connection closed by peer");
            break;
        }

        if buf.len() > MAX_REQUEST_SIZE {
            warn!(peer = %peer_addr, "request too large, sending 413");
            let response = Response::json(413, &json!({"error": "Request entity too large"}))
                .keep_alive(false);
            write_response(&mut stream, response).await?;
            break;
        }

        let (request, body_offset) = match Request::parse(&buf) {
            Ok(pair) => pair,
            Err(RequestError::Incomplete) => {
                // Headers not yet fully received.
                continue;
            }
            Err(e) => {
                warn!(peer = %peer_addr, error = %e, "bad request, sending 400");
                let response =
                    Response::json(400, &json!({"error": "Bad request"})).keep_alive(false);
                write_response(&mut stream, response).await?;
                break;
            }
        };

        // Wait for the full body if Content-Length is set.
        let content_length = request.content_length().unwrap_or(0);
        let total_needed = body_offset + content_length;
        if buf.len() < total_needed {
            continue;
        }

        let body = Bytes::copy_from_slice(&buf[body_offset..total_needed]);
        let keep_alive = request.is_keep_alive();

        debug!(
            peer = %peer_addr,
            method = %request.method(),
            path = %request.path(),
            "dispatching request"
        );

        let response = api::route(&state, &request, body).await;
        let response_keep_alive = write_response(&mut stream, response).await?;

        let _ = buf.split_to(total_needed);

        if !keep_alive || !response_keep_alive {
            debug!(peer = %peer_addr, "closing connection");
            break;
        }
    }

    Ok(())
}

/// Writes a response to the peer, returning whether the connection may be
/// reused afterwards.
///
/// Streamed bodies are written as chunked transfer coding, one chunk per
/// relay frame. A relay error aborts the response mid-stream: the terminal
/// chunk is never written and the connection is torn down, which is the
/// only remaining way to signal failure once the head has been sent.
async fn write_response(stream: &mut TcpStream, response: Response) -> io::Result<bool> {
    let keep_alive = response.keep_alive;
    let head = response.head_bytes();
    stream.write_all(&head).await?;

    match response.body {
        Body::Full(body) => {
            stream.write_all(&body).await?;
            stream.flush().await?;
            Ok(keep_alive)
        }
        Body::Stream(mut body) => {
            while let Some(frame) = body.next().await {
                match frame {
                    Ok(bytes) => {
                        write_chunk(stream, &bytes).await?;
                        stream.flush().await?;
                    }
                    Err(e) => {
                        warn!(error = %e, "upstream stream error, aborting response");
                        return Err(io::Error::other(e.to_string()));
                    }
                }
            }
            stream.write_all(b"0\r\n\r\n").await?;
            stream.flush().await?;
            Ok(keep_alive)
        }
    }
}

/// Writes one chunked-transfer-coding chunk.
async fn write_chunk(stream: &mut TcpStream, data: &[u8]) -> io::Result<()> {
    stream
        .write_all(format!("{:x}\r\n", data.len()).as_bytes())
        .await?;
    stream.write_all(data).await?;
    stream.write_all(b"\r\n").await?;
    Ok(())
}
