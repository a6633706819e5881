//! Service registry server implementation.
//!
//! # Rust Learning Note
//!
//! ## Dependency Injection Instead of Globals
//!
//! The registry is created here and handed to the route handlers as an
//! `Arc<Registry>`. Nothing reaches it through a global, so a test can
//! build as many independent registries as it likes, and the server can
//! still hand out a clone of the `Arc` to code that wants to inspect or
//! seed the registry directly.

use crate::{api::register_routes, config::RegistryConfig, storage::Registry};
use std::sync::Arc;
use svcreg_common::{Result, ResultExt};
use svcreg_http::{HttpServer, ServerHandle};
use tracing::info;

/// Service registry server.
pub struct RegistryServer {
    registry: Arc<Registry>,
    config: RegistryConfig,
    http: HttpServer,
}

impl RegistryServer {
    /// Creates the registry, seeds the configured services and wires the
    /// HTTP routes. Nothing is bound until [`start`](Self::start).
    pub fn new(config: RegistryConfig) -> Self {
        let registry = Arc::new(Registry::new());

        for service in &config.services {
            registry.register(&service.name, &service.host, service.port);
        }

        let mut http = HttpServer::new();
        register_routes(&mut http, Arc::clone(&registry));

        Self {
            registry,
            config,
            http,
        }
    }

    /// Returns a reference to the registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Binds the configured address and starts serving in the background.
    pub async fn start(self) -> Result<ServerHandle> {
        let Self { registry, config, http } = self;
        let host = config.server.host.as_str();
        let port = config.server.port;

        info!(
            "Starting service registry on {}:{} ({} services preloaded)",
            host,
            port,
            registry.count()
        );

        http.listen((host, port))
            .await
            .context(format!("Failed to bind {}:{}", host, port))
    }
}
