//! # svcreg common
//!
//! Types shared by every crate in the service registry workspace: the
//! error type used by the HTTP plumbing and the `ServiceID` identifier
//! that keys the registry.

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{Error, Result, ResultExt};
pub use types::ServiceID;
