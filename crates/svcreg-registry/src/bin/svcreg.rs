//! Standalone service registry server.

use anyhow::{Context, Result};
use clap::Parser;
use svcreg_registry::{RegistryConfig, RegistryServer, ServiceEndpoint};
use tracing::info;

/// In-memory service registry with a JSON HTTP API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Preload two demo services and log example requests
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RegistryConfig::load_from_file(path)?,
        None => RegistryConfig::default(),
    };

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.demo {
        config.services.push(ServiceEndpoint::new("demoService1", "localhost", 4001));
        config.services.push(ServiceEndpoint::new("demoService2", "localhost", 4002));
    }
    config.validate()?;

    initialize_logging(if args.debug { "debug" } else { &config.log_level });

    if let Some(path) = &args.config {
        info!("Config file: {}", path);
    }

    let server = RegistryServer::new(config);
    let handle = server.start().await?;

    info!("Service registry started, listening on {}", handle.local_addr());
    if args.demo {
        log_example_requests(handle.local_addr().port());
    }
    info!("Press Ctrl+C to stop");

    shutdown_signal().await?;

    handle
        .shutdown()
        .await
        .context("Failed to stop HTTP server")?;
    info!("Service registry stopped");

    Ok(())
}

fn initialize_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();
}

fn log_example_requests(port: u16) {
    let base = format!("http://localhost:{}", port);

    info!("Get all services:        GET {}/services", base);
    info!("Find services by name:   GET {}/services/find?name=demoService1", base);
    info!(
        "Register new service:    POST {}/services  {{\"name\":\"demoService3\",\"host\":\"localhost\",\"port\":4003}}",
        base
    );
    info!(
        "Unregister service:      DELETE {}/services?id=demoService1-localhost-4001",
        base
    );
}

async fn shutdown_signal() -> Result<()> {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal");
            }
        }
    }

    #[cfg(windows)]
    {
        signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;
        info!("Received Ctrl+C signal");
    }

    Ok(())
}
