//! Server Module
//!
//! The concurrency front of the system: a fixed worker pool and the
//! blocking TCP accept loop that feeds it.
//!
//! ```text
//! ┌──────────────┐   submit    ┌─────────────────────────┐
//! │  TcpServer   │────────────▶│       WorkerPool        │
//! │ (accept loop)│             │ worker-0 … worker-N     │
//! └──────────────┘             └───────────┬─────────────┘
//!                                          │ handler(stream, peer)
//!                                          ▼
//!                              connection::handle_connection
//! ```
//!
//! One OS thread runs the accept loop (the caller of
//! [`TcpServer::start`]); N worker threads execute connection handlers.
//! There is no per-request thread creation.

pub mod acceptor;
pub mod pool;

// Re-export commonly used types
pub use acceptor::TcpServer;
pub use pool::{Task, WorkerPool};
