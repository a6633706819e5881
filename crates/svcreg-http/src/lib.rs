//! # svcreg http
//!
//! General-purpose JSON-over-HTTP plumbing used by the service registry.
//! Nothing in here knows about services:
//!
//! - [`HttpServer`]: a router keyed by `(method, exact path)` served over
//!   HTTP/1.1 with hyper
//! - [`HttpRequest`] / [`HttpResponse`]: the context and response wrapper
//!   handed to and returned from route handlers
//! - [`HttpClient`]: a small client that sends JSON and lets callers
//!   inspect any status code

pub mod client;
pub mod request;
pub mod response;
pub mod server;

// Re-export commonly used items
pub use client::{ClientResponse, HttpClient, RequestOptions, ResponseBody};
pub use hyper::{Method, StatusCode};
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use server::{HttpServer, ServerHandle};
