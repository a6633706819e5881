//! HTTP API handlers.
//!
//! | Method | Path             | Input         | Success                 |
//! |--------|------------------|---------------|-------------------------|
//! | GET    | `/services`      | -             | 200, map of all records |
//! | GET    | `/services/find` | `?name=`      | 200, array of matches   |
//! | POST   | `/services`      | `{name,host,port}` | 201, created record |
//! | DELETE | `/services`      | `?id=`        | 204, empty body         |
//!
//! Validation failures answer 400 with `{"error": "..."}`; deleting an
//! unknown id answers 404 with the same shape.

use crate::{
    storage::Registry,
    types::{ErrorResponse, ServiceEndpoint},
};
use serde_json::Value;
use std::future::ready;
use std::sync::Arc;
use svcreg_common::ServiceID;
use svcreg_http::{HttpRequest, HttpResponse, HttpServer, StatusCode};
use tracing::{debug, warn};

pub const SERVICES_PATH: &str = "/services";
pub const FIND_PATH: &str = "/services/find";

/// Wires the registry routes into `server`.
///
/// Each handler captures its own `Arc` to the shared registry; nothing
/// is reached through global state.
pub fn register_routes(server: &mut HttpServer, registry: Arc<Registry>) {
    let list = Arc::clone(&registry);
    let find = Arc::clone(&registry);
    let create = Arc::clone(&registry);
    let remove = registry;

    server
        .get(SERVICES_PATH, move |_req| ready(list_handler(&list)))
        .get(FIND_PATH, move |req| ready(find_handler(&find, &req)))
        .post(SERVICES_PATH, move |req| ready(register_handler(&create, &req)))
        .delete(SERVICES_PATH, move |req| ready(unregister_handler(&remove, &req)));
}

/// Lists all registered services.
fn list_handler(registry: &Registry) -> HttpResponse {
    debug!("Listing all services");
    HttpResponse::json(StatusCode::OK, &registry.get_all())
}

/// Finds services by exact name.
fn find_handler(registry: &Registry, req: &HttpRequest) -> HttpResponse {
    let Some(name) = req.query_param("name").filter(|name| !name.is_empty()) else {
        return ApiError::BadRequest("Missing name parameter".to_string()).into_response();
    };

    debug!("Finding services named {}", name);
    HttpResponse::json(StatusCode::OK, &registry.find_by_name(name))
}

/// Registers a service from a `{name, host, port}` body.
fn register_handler(registry: &Registry, req: &HttpRequest) -> HttpResponse {
    let endpoint = match parse_endpoint(req) {
        Ok(endpoint) => endpoint,
        Err(e) => return e.into_response(),
    };

    let record = registry.register(&endpoint.name, &endpoint.host, endpoint.port);
    HttpResponse::json(StatusCode::CREATED, &record)
}

/// Unregisters a service by id.
fn unregister_handler(registry: &Registry, req: &HttpRequest) -> HttpResponse {
    let Some(id) = req.query_param("id").filter(|id| !id.is_empty()) else {
        return ApiError::BadRequest("Missing id parameter".to_string()).into_response();
    };

    if registry.unregister(&ServiceID::from(id)) {
        HttpResponse::empty(StatusCode::NO_CONTENT)
    } else {
        ApiError::NotFound("Service not found".to_string()).into_response()
    }
}

/// Validates a registration body.
///
/// Missing fields are checked before types, so a body with one absent
/// field always reports `Missing required parameters`.
fn parse_endpoint(req: &HttpRequest) -> Result<ServiceEndpoint, ApiError> {
    let name = req.body_field("name");
    let host = req.body_field("host");
    let port = req.body_field("port");

    if [name, host, port].into_iter().any(is_missing) {
        return Err(ApiError::BadRequest("Missing required parameters".to_string()));
    }

    let name = name
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("Invalid name parameter".to_string()))?;
    let host = host
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("Invalid host parameter".to_string()))?;
    let port = port
        .and_then(port_number)
        .ok_or_else(|| ApiError::BadRequest("Invalid port parameter".to_string()))?;

    Ok(ServiceEndpoint::new(name, host, port))
}

/// Absent, `null`, `false`, `""` and `0` all count as missing.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Accepts `4000`, `4000.0` or `"4000"`, rejecting fractions and anything
/// outside 1..=65535.
fn port_number(value: &Value) -> Option<u16> {
    let port = match value {
        Value::Number(n) => match n.as_u64() {
            Some(p) => u16::try_from(p).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(f))
                .map(|f| f as u16),
        },
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    }?;

    (port != 0).then_some(port)
}

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
}

impl ApiError {
    pub fn into_response(self) -> HttpResponse {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        warn!("API error: {} - {}", status, message);

        HttpResponse::json(status, &ErrorResponse { error: message })
    }
}
