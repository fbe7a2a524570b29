//! Version router service.
//!
//! Serves the `[[routes]]` of a TOML config, dispatching each request by the
//! version token in the configured header.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use version_router::config::{load_config, RouterConfig};
use version_router::observability::{logging, metrics};
use version_router::AppServer;

#[derive(Parser)]
#[command(name = "version-router")]
#[command(about = "Serve versioned routes from a TOML configuration", long_about = None)]
struct Cli {
    /// Configuration file (defaults are used when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("version-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        header = %config.version.header,
        strict = config.version.strict,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = AppServer::new(config)?;
    tracing::info!(
        routes = server.config().routes.len(),
        header = %server.config().version.header,
        "Routes mounted"
    );
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
