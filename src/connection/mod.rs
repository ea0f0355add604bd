//! Connection Module
//!
//! Per-connection request handling: buffered reads off the socket, the
//! parse → route → respond cycle, and the shared connection statistics.
//! Handlers run as worker-pool tasks; the stream is owned by the task and
//! closes when it finishes.

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
