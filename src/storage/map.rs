//! Concurrent Hash Map with a Reader-Writer Lock
//!
//! This module implements the lowest layer of the storage stack: a generic
//! hash map that is safe to share across every thread in the server.
//!
//! ## Concurrency Model
//!
//! A key-value store is read-heavy (many GETs, fewer SETs), so the map uses
//! a single `RwLock` rather than a plain mutex:
//!
//! - **Shared lock** (`read`): any number of `get`/`keys`/`for_each`/`len`
//!   calls can proceed in parallel.
//! - **Exclusive lock** (`write`): `set`/`remove`/`remove_if` serialize
//!   against each other and against all readers.
//!
//! Because every mutation happens inside one exclusive-lock critical
//! section, a concurrent reader can never observe a half-written entry.
//!
//! ## Iteration
//!
//! Handing out an iterator that holds the lock is easy to misuse, so the map
//! offers two safe shapes instead:
//!
//! - [`ConcurrentMap::keys`] takes a snapshot under the shared lock. The
//!   returned `Vec` is safe to iterate after the lock is released and does
//!   not reflect later mutations.
//! - [`ConcurrentMap::for_each`] runs a visitor over every entry under one
//!   shared lock, so the map cannot change mid-traversal. The visitor must
//!   not call back into the map: any mutating call would need the exclusive
//!   lock and deadlock against the shared lock already held.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

/// A hash map safe for many simultaneous readers and serialized writers.
///
/// # Example
///
/// ```
/// use hearthkv::storage::ConcurrentMap;
///
/// let map: ConcurrentMap<String, u32> = ConcurrentMap::new();
///
/// map.set("answer".to_string(), 42);
/// assert_eq!(map.get("answer"), Some(42));
/// assert!(map.remove("answer"));
/// assert_eq!(map.get("answer"), None);
/// ```
#[derive(Debug)]
pub struct ConcurrentMap<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a clone of the value for `key`, or `None` if absent.
    ///
    /// Multiple concurrent `get` calls proceed in parallel under the shared
    /// lock.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let map = self.inner.read().unwrap();
        map.get(key).cloned()
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// Takes the exclusive lock; the insert is atomic with respect to every
    /// concurrent `get`, `remove`, `for_each`, and `remove_if`.
    pub fn set(&self, key: K, value: V) {
        let mut map = self.inner.write().unwrap();
        map.insert(key, value);
    }

    /// Removes `key` from the map.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was present, `false` otherwise.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let mut map = self.inner.write().unwrap();
        map.remove(key).is_some()
    }

    /// Returns a snapshot of every key.
    ///
    /// The copy is taken under the shared lock and is safe to iterate after
    /// the lock is released; it does not reflect subsequent mutations.
    pub fn keys(&self) -> Vec<K> {
        let map = self.inner.read().unwrap();
        map.keys().cloned().collect()
    }

    /// Invokes `visitor` for every entry under one shared lock held for the
    /// whole traversal.
    ///
    /// The visitor is read-only by contract: calling any mutating map method
    /// from inside it would deadlock on the lock already held.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &V),
    {
        let map = self.inner.read().unwrap();
        for (key, value) in map.iter() {
            visitor(key, value);
        }
    }

    /// Removes every entry for which `predicate` returns `true`.
    ///
    /// The whole scan-and-remove happens under one exclusive lock, so no
    /// concurrent reader observes a partially-swept state.
    ///
    /// # Returns
    ///
    /// Returns the number of entries removed.
    pub fn remove_if<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut map = self.inner.write().unwrap();
        let before = map.len();
        map.retain(|key, value| !predicate(key, value));
        before - map.len()
    }

    /// Returns the number of entries, taken under the shared lock.
    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap();
        map.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
