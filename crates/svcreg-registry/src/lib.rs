//! # svcreg registry
//!
//! In-memory service registry for service discovery.
//!
//! This crate provides:
//! - In-memory registry storage (thread-safe with DashMap)
//! - HTTP API for registering, listing, finding and removing services
//! - YAML configuration for the standalone server
//! - Standalone server executable (`svcreg`)

pub mod api;
pub mod config;
pub mod server;
pub mod storage;
pub mod types;

// Re-export commonly used items
pub use config::{RegistryConfig, ServerConfig};
pub use server::RegistryServer;
pub use storage::Registry;
pub use types::{ServiceEndpoint, ServiceRecord};
