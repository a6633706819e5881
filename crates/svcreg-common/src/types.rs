//! Core identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service identifier - uniquely identifies one registered endpoint.
///
/// The identifier is not generated: it is derived from the endpoint's
/// name, host and port, so registering the same triple twice lands on
/// the same key.
///
/// # Rust Learning Note
///
/// ## Newtype Pattern
///
/// ```rust
/// pub struct ServiceID(String);
/// ```
///
/// Wrapping a `String` in a single-field struct costs nothing at runtime
/// but keeps a service id from being mixed up with a service *name*,
/// which is also a `String`. serde serializes a newtype struct as its
/// inner value, so on the wire this is still a plain JSON string and can
/// be used as a JSON object key.
///
/// # Example
/// ```
/// use svcreg_common::ServiceID;
///
/// let id = ServiceID::derive("billing", "localhost", 4000);
/// assert_eq!(id.as_str(), "billing-localhost-4000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceID(String);

impl ServiceID {
    /// Creates a new ServiceID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the identifier for a `(name, host, port)` triple.
    pub fn derive(name: &str, host: &str, port: u16) -> Self {
        Self(format!("{}-{}-{}", name, host, port))
    }

    /// Returns the service ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ServiceID {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ServiceID {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ServiceID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
