//! HTTP Protocol Implementation
//!
//! The small slice of HTTP/1.1 the server speaks: an incremental request
//! parser, a response builder, and a prefix router.
//!
//! ## Modules
//!
//! - `request`: `HttpRequest`, `HttpMethod`, and the incremental parser
//! - `response`: `HttpResponse` builder and wire serialization
//! - `router`: ordered prefix routing to handler closures
//!
//! ## Example
//!
//! ```
//! use hearthkv::http::{HttpMethod, HttpRequest, HttpResponse, Router};
//!
//! let mut router = Router::new();
//! router.add_route(HttpMethod::Get, "/ping", |_req, _params| {
//!     HttpResponse::ok().body("pong")
//! });
//!
//! let raw = b"GET /ping HTTP/1.1\r\n\r\n";
//! let (request, _consumed) = HttpRequest::parse(raw).unwrap().unwrap();
//! let response = router.route(&request);
//! assert_eq!(response.status_code(), 200);
//! ```

pub mod request;
pub mod response;
pub mod router;

// Re-export commonly used types for convenience
pub use request::{HttpMethod, HttpRequest, ParseError, MAX_BODY_SIZE, MAX_HEAD_SIZE};
pub use response::HttpResponse;
pub use router::{RouteParams, Router};
