//! Request context passed to route handlers.

use hyper::{HeaderMap, Method};
use serde_json::Value;
use std::collections::HashMap;

/// An incoming request as seen by a handler.
///
/// The router fills this in before calling the handler: the query string
/// is already decoded and, for `POST`/`PUT`, the body is already buffered
/// and parsed as JSON.
///
/// # Rust Learning Note
///
/// ## Explicit Context Type
///
/// Instead of bolting extra properties onto a generic request object at
/// runtime, the router builds a dedicated struct. Every handler sees the
/// same fields with the same types, and the compiler tells us if a
/// handler asks for something that does not exist.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    /// Decoded query parameters. For repeated keys the first value wins.
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    /// Parsed JSON body; `None` for methods other than `POST`/`PUT`.
    ///
    /// An empty or malformed body is presented as `{}` rather than
    /// reported to the handler.
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Returns a query parameter by name.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns a top-level field of the JSON body.
    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get(key))
    }

    /// Decodes a raw `application/x-www-form-urlencoded` query string.
    pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
        let mut params = HashMap::new();

        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                params
                    .entry(key.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }

        params
    }
}
