//! Prometheus exporter for dump1090 receivers.

use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use dump1090_exporter::{ExporterConfig, HttpServer, init_tracing};

/// Prometheus exporter for dump1090 receivers.
#[derive(Parser, Debug)]
#[command(name = "dump1090-exporter")]
#[command(about = "Export dump1090 aircraft as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// The address to listen on for HTTP requests (overrides config).
    #[arg(long, visible_alias = "listen")]
    listen_address: Option<String>,

    /// Log level (trace, debug, info, warn, error), overrides config.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // CLI overrides
    if let Some(listen) = &args.listen_address {
        config.http.listen = listen.clone();
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!("Starting dump1090 exporter");

    let listen_addr = config.listen_addr()?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_server = HttpServer::new(
        listen_addr,
        config.http.metrics_path.clone(),
        config.scrape.clone(),
    );
    let mut http_task = tokio::spawn(http_server.run(shutdown_rx));

    tokio::select! {
        result = &mut http_task => {
            error!("HTTP server exited unexpectedly");
            return result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    shutdown_tx.send(true)?;

    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    info!("Exporter stopped");
    Ok(())
}

/// Resolves when the process receives SIGTERM.
async fn terminate() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        std::future::pending::<()>().await;
    }
}
