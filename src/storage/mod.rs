//! Storage Module
//!
//! The core of the server: a thread-safe key-value store with TTL support
//! and a background expiry sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  KvStore                    │
//! │    TTL computation, lazy deletion, sweep    │
//! │  ┌───────────────────────────────────────┐  │
//! │  │          ConcurrentMap<K, V>          │  │
//! │  │         RwLock<HashMap<K, V>>         │  │
//! │  └───────────────────────────────────────┘  │
//! └─────────────────────────────────────────────┘
//!                       ▲
//!                       │ cleanup_expired()
//!         ┌─────────────┴─────────────┐
//!         │       ExpirySweeper       │
//!         │    (background thread)    │
//!         └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Reader-writer locking**: concurrent readers, exclusive writers
//! - **TTL support**: entries can carry a time-to-live in seconds
//! - **Lazy expiry**: expired entries are reclaimed on access
//! - **Active expiry**: the sweeper reclaims entries nobody reads
//!
//! ## Example
//!
//! ```
//! use hearthkv::storage::KvStore;
//! use bytes::Bytes;
//!
//! let store = KvStore::new();
//!
//! // A permanent entry (TTL of zero never expires)
//! store.set("name", Bytes::from("Ariz"), 0);
//! assert_eq!(store.get("name"), Some(Bytes::from("Ariz")));
//!
//! // An entry that expires after an hour
//! store.set("session", Bytes::from("token123"), 3600);
//! ```

pub mod expiry;
pub mod map;
pub mod store;

// Re-export commonly used types
pub use expiry::{ExpirySweeper, DEFAULT_SWEEP_INTERVAL};
pub use map::ConcurrentMap;
pub use store::{Entry, KvStore};
