//! REST Endpoints for the Key-Value Store
//!
//! Binds the HTTP router to [`KvStore`] operations:
//!
//! | Route              | Store call        | Response                           |
//! |--------------------|-------------------|------------------------------------|
//! | `GET /kv/{key}`    | `get(key)`        | 200 value / 404                    |
//! | `PUT /kv/{key}`    | `set(key, body)`  | 201 `OK` (TTL from `X-TTL` header) |
//! | `DELETE /kv/{key}` | `remove(key)`     | 200 / 404                          |
//! | `GET /kv`          | `keys()`          | 200, newline-separated keys        |
//!
//! The request body is the value verbatim; the optional `X-TTL` header
//! carries the time-to-live in seconds (invalid values are logged and
//! treated as 0, i.e. no expiry).

use crate::http::{HttpMethod, HttpRequest, HttpResponse, RouteParams, Router};
use crate::storage::KvStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Wires the KV endpoints into a router.
pub struct KvApi {
    store: Arc<KvStore>,
}

impl KvApi {
    /// Creates the API layer over a shared store.
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    /// Registers all KV routes.
    ///
    /// The `/kv/` routes are registered before the exact `/kv` list route;
    /// first match wins, so the more specific prefix goes first.
    pub fn register_routes(&self, router: &mut Router) {
        let store = Arc::clone(&self.store);
        router.add_route(HttpMethod::Get, "/kv/", move |req, params| {
            get_key(&store, req, params)
        });

        let store = Arc::clone(&self.store);
        router.add_route(HttpMethod::Put, "/kv/", move |req, params| {
            put_key(&store, req, params)
        });

        let store = Arc::clone(&self.store);
        router.add_route(HttpMethod::Delete, "/kv/", move |req, params| {
            delete_key(&store, req, params)
        });

        let store = Arc::clone(&self.store);
        router.add_route(HttpMethod::Get, "/kv", move |req, params| {
            list_keys(&store, req, params)
        });

        info!("kv routes registered");
    }
}

/// `GET /kv/{key}` - retrieve a value.
fn get_key(store: &KvStore, _request: &HttpRequest, params: &RouteParams) -> HttpResponse {
    let key = &params.suffix;

    if key.is_empty() {
        return HttpResponse::bad_request().body("Key cannot be empty");
    }

    match store.get(key) {
        Some(value) => HttpResponse::ok().body(value),
        None => HttpResponse::not_found().body(format!("Key not found: {}", key)),
    }
}

/// `PUT /kv/{key}` - store a value; the body is the value, `X-TTL` the TTL.
fn put_key(store: &KvStore, request: &HttpRequest, params: &RouteParams) -> HttpResponse {
    let key = &params.suffix;

    if key.is_empty() {
        return HttpResponse::bad_request().body("Key cannot be empty");
    }

    let ttl_seconds = match request.header("X-TTL") {
        Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
            warn!(value = raw, "invalid X-TTL header, storing without expiry");
            0
        }),
        None => 0,
    };

    store.set(key.clone(), request.body().clone(), ttl_seconds);

    HttpResponse::created().body("OK")
}

/// `DELETE /kv/{key}` - remove a key.
fn delete_key(store: &KvStore, _request: &HttpRequest, params: &RouteParams) -> HttpResponse {
    let key = &params.suffix;

    if key.is_empty() {
        return HttpResponse::bad_request().body("Key cannot be empty");
    }

    if store.remove(key) {
        HttpResponse::ok().body(format!("Deleted: {}", key))
    } else {
        HttpResponse::not_found().body(format!("Key not found: {}", key))
    }
}

/// `GET /kv` - list all live keys, newline-separated.
fn list_keys(store: &KvStore, _request: &HttpRequest, _params: &RouteParams) -> HttpResponse {
    let keys = store.keys();
    HttpResponse::ok().body(keys.join("\n"))
}
