//! # HearthKV - An In-Memory Key-Value Store Served over HTTP
//!
//! HearthKV is a TTL-aware, in-memory key-value store written in Rust.
//! It demonstrates systems programming concepts like concurrent data
//! structures, OS-thread worker pools, and protocol parsing.
//!
//! ## Features
//!
//! - **HTTP API**: GET/PUT/DELETE values and list keys with any HTTP client
//! - **TTL Support**: entries can expire, with lazy + background cleanup
//! - **Reader-Writer Locking**: many concurrent readers, exclusive writers
//! - **Fixed Worker Pool**: connections are handled by long-lived threads,
//!   no per-request thread creation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              HearthKV                               │
//! │                                                                     │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐              │
//! │  │  TcpServer  │───>│ WorkerPool  │───>│ Connection  │              │
//! │  │(accept loop)│    │ (N threads) │    │  Handler    │              │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘              │
//! │                                               │                     │
//! │  ┌─────────────┐    ┌─────────────┐           ▼                     │
//! │  │    HTTP     │    │   Router    │    ┌─────────────┐              │
//! │  │   Parser    │───>│  (prefix)   │───>│    KvApi    │              │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘              │
//! │                                               │                     │
//! │                                               ▼                     │
//! │                     ┌──────────────────────────────────────────┐    │
//! │                     │                 KvStore                  │    │
//! │                     │       ConcurrentMap<String, Entry>       │    │
//! │                     │          RwLock<HashMap<K, V>>           │    │
//! │                     └──────────────────────────────────────────┘    │
//! │                                               ▲                     │
//! │                                               │                     │
//! │                     ┌─────────────────────────┴────────────────┐    │
//! │                     │              ExpirySweeper               │    │
//! │                     │           (background thread)            │    │
//! │                     └──────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use hearthkv::api::KvApi;
//! use hearthkv::connection::{handle_connection, ConnectionStats};
//! use hearthkv::http::Router;
//! use hearthkv::server::TcpServer;
//! use hearthkv::storage::{ExpirySweeper, KvStore};
//! use std::sync::Arc;
//!
//! // Create the store shared by every connection and the sweeper
//! let store = Arc::new(KvStore::new());
//!
//! // Start the background expiry sweeper
//! let mut sweeper = ExpirySweeper::new(Arc::clone(&store));
//! sweeper.start().unwrap();
//!
//! // Wire the REST API into a router
//! let mut router = Router::new();
//! KvApi::new(Arc::clone(&store)).register_routes(&mut router);
//! let router = Arc::new(router);
//! let stats = Arc::new(ConnectionStats::new());
//!
//! // Serve until stop() is called; each connection runs on a pool worker
//! let server = TcpServer::new("127.0.0.1", 8080, 4).unwrap();
//! server.start(move |stream, peer| {
//!     handle_connection(stream, peer, Arc::clone(&router), Arc::clone(&stats));
//! });
//!
//! // Teardown order matters: the sweeper stops before the store drops
//! sweeper.stop();
//! ```
//!
//! ## HTTP API
//!
//! | Request                         | Effect                               |
//! |---------------------------------|--------------------------------------|
//! | `PUT /kv/{key}` (body = value)  | Store; optional `X-TTL: seconds`     |
//! | `GET /kv/{key}`                 | Fetch (404 if missing or expired)    |
//! | `DELETE /kv/{key}`              | Remove (404 if missing)              |
//! | `GET /kv`                       | Newline-separated list of live keys  |
//!
//! ## Module Overview
//!
//! - [`storage`]: concurrent map, TTL store, and expiry sweeper
//! - [`server`]: worker pool and blocking accept loop
//! - [`http`]: request parser, response builder, router
//! - [`api`]: REST endpoints bound to the store
//! - [`connection`]: per-connection handling and statistics
//!
//! ## Design Highlights
//!
//! ### Thread Safety
//!
//! The store is one reader-writer-locked hash map. Reads share the lock;
//! every mutation (including the bulk expiry sweep) runs under a single
//! exclusive critical section, so readers never observe partial state.
//!
//! ### Lazy + Active Expiry
//!
//! Keys with TTL are expired in two ways:
//! 1. **Lazy**: when a key is read, its expiry is checked and the entry
//!    removed on the spot
//! 2. **Active**: a background thread periodically sweeps all entries
//!
//! This reclaims memory even for keys that are never accessed again.
//!
//! ### Monotonic Time
//!
//! Expiry instants come from the monotonic clock, so wall-clock
//! adjustments never expire or revive a key.

pub mod api;
pub mod connection;
pub mod http;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use api::KvApi;
pub use connection::{handle_connection, ConnectionStats};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Router};
pub use server::{TcpServer, WorkerPool};
pub use storage::{ExpirySweeper, KvStore};

/// The default port HearthKV listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host HearthKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default number of worker threads
pub const DEFAULT_WORKERS: usize = 4;

/// Version of HearthKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
