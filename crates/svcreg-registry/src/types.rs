//! Data types for the service registry.
//!
//! # Rust Learning Note
//!
//! `serde` derives give us the JSON shape for free. Field names are
//! already lower-case single words, so no `rename_all` is needed and the
//! struct below serializes exactly as:
//!
//! ```json
//! {"id":"svcA-localhost-4000","name":"svcA","host":"localhost",
//!  "port":4000,"url":"http://localhost:4000","timestamp":1700000000000}
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use svcreg_common::ServiceID;

/// A registered network endpoint.
///
/// Everything except `name`, `host` and `port` is derived at
/// registration time and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// `name-host-port`; see [`ServiceID::derive`].
    pub id: ServiceID,

    /// Logical service name. Several records may share it.
    pub name: String,

    pub host: String,

    pub port: u16,

    /// Always `http://host:port`.
    pub url: String,

    /// Registration instant, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ServiceRecord {
    /// Builds a record stamped with the current time.
    pub fn new(name: &str, host: &str, port: u16) -> Self {
        Self {
            id: ServiceID::derive(name, host, port),
            name: name.to_string(),
            host: host.to_string(),
            port,
            url: format!("http://{}:{}", host, port),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// The `(name, host, port)` triple a record is built from.
///
/// Used for seeding the registry from configuration and as the validated
/// form of a registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl ServiceEndpoint {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
