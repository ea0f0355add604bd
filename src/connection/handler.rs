//! Connection Handler
//!
//! Runs one client connection from accept to close, on whichever worker
//! thread the pool picked:
//!
//! ```text
//! 1. Read bytes from the socket into the buffer
//!        │
//!        ▼
//! 2. Try to parse a complete HTTP request
//!        │ incomplete → back to 1
//!        ▼
//! 3. Route to the matching handler
//!        │
//!        ▼
//! 4. Write the response, flush, close
//! ```
//!
//! The server speaks one request per connection (`Connection: close`), so
//! the loop ends after the first complete request. A `BytesMut` buffer
//! accumulates reads because a single `read` may return half a request.

use crate::http::{HttpRequest, HttpResponse, ParseError, Router, MAX_BODY_SIZE, MAX_HEAD_SIZE};
use bytes::BytesMut;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Hard cap on buffered request bytes; a backstop behind the parser's own
/// head and body limits.
const MAX_BUFFER_SIZE: usize = MAX_HEAD_SIZE + MAX_BODY_SIZE;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Bytes read from the socket per syscall
const READ_CHUNK_SIZE: usize = 4096;

/// Statistics for connection handling, shared across all workers.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections handled
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total requests processed
    pub requests_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn request_processed(&self) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
pub struct ConnectionHandler {
    /// The TCP stream for this connection; closed on drop
    stream: TcpStream,

    /// Client's address (for logging)
    peer: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The route table (shared across connections)
    router: Arc<Router>,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a handler for an accepted stream.
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        router: Arc<Router>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            router,
            stats,
        }
    }

    /// Serves the connection to completion.
    pub fn run(mut self) -> Result<(), ConnectionError> {
        debug!(client = %self.peer, "client connected");

        let result = self.serve_request();

        match &result {
            Ok(()) => debug!(client = %self.peer, "request served"),
            Err(ConnectionError::ClientDisconnected) => {
                debug!(client = %self.peer, "client disconnected")
            }
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.peer, "connection reset by client")
            }
            Err(e) => warn!(client = %self.peer, error = %e, "connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The read-parse-route-respond cycle for one request.
    fn serve_request(&mut self) -> Result<(), ConnectionError> {
        loop {
            match HttpRequest::parse(&self.buffer) {
                Ok(Some((request, consumed))) => {
                    trace!(
                        client = %self.peer,
                        consumed,
                        "parsed request"
                    );

                    let response = self.router.route(&request);
                    self.stats.request_processed();
                    self.send_response(&response)?;
                    return Ok(());
                }
                Ok(None) => {
                    // Incomplete request: keep reading
                    self.read_more_data()?;
                }
                Err(e) => {
                    warn!(client = %self.peer, error = %e, "bad request");
                    let response = HttpResponse::bad_request().body("Invalid HTTP request");
                    self.send_response(&response)?;
                    return Err(ConnectionError::Parse(e));
                }
            }
        }
    }

    /// Reads more data from the socket into the buffer.
    fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            let response = HttpResponse::bad_request().body("Request too large");
            self.send_response(&response)?;
            return Err(ConnectionError::BufferFull);
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let n = self.stream.read(&mut chunk)?;

        if n == 0 {
            // Peer closed its write side
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            }
            return Err(ConnectionError::UnexpectedEof);
        }

        self.buffer.extend_from_slice(&chunk[..n]);
        self.stats.bytes_read(n);
        trace!(client = %self.peer, bytes = n, "read data");

        Ok(())
    }

    /// Writes a response and flushes it.
    fn send_response(&mut self, response: &HttpResponse) -> Result<(), ConnectionError> {
        let wire = response.build();
        self.stream.write_all(&wire)?;
        self.stream.flush()?;
        self.stats.bytes_written(wire.len());
        trace!(
            client = %self.peer,
            bytes = wire.len(),
            status = response.status_code(),
            "sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP parse error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Client disconnected before sending a request
    #[error("client disconnected")]
    ClientDisconnected,

    /// Stream ended mid-request
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("buffer size limit exceeded")]
    BufferFull,
}

/// Handles a client connection to completion.
///
/// This is the function the acceptor wraps in a pool task; the stream is
/// owned by the handler and closes when it returns. Routine disconnects
/// are already logged at debug level inside [`ConnectionHandler::run`], so
/// the error result is intentionally dropped here.
pub fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Arc<Router>,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, peer, router, stats);
    let _ = handler.run();
}
