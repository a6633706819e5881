//! Configuration for the standalone registry server.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 3000
//! log_level: info
//! services:
//!   - name: billing
//!     host: 10.0.0.7
//!     port: 8081
//! ```
//!
//! Every key is optional; see the `default_*` functions below.

use crate::types::ServiceEndpoint;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Services registered before the server starts accepting requests.
    #[serde(default)]
    pub services: Vec<ServiceEndpoint>,
}

/// Listener options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// `0` asks the OS for a free port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: default_log_level(),
            services: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::load_from_string(&content)
    }

    /// Load configuration from a YAML string
    pub fn load_from_string(content: &str) -> Result<Self> {
        let config: RegistryConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("Server host cannot be empty"));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(anyhow!(
                    "Invalid log level: {}, must be one of: trace, debug, info, warn, error",
                    self.log_level
                ))
            }
        }

        for (index, service) in self.services.iter().enumerate() {
            if service.name.is_empty() || service.host.is_empty() {
                return Err(anyhow!(
                    "Service #{} must have a non-empty name and host",
                    index + 1
                ));
            }
            if service.port == 0 {
                return Err(anyhow!("Service '{}' has port 0", service.name));
            }
        }

        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}
