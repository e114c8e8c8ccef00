//! Multi-target Prometheus exporter for dump1090 ADS-B receivers.
//!
//! The exporter holds no metrics of its own. Each scrape names the receiver
//! to query, and the aircraft it reports are turned into gauges in a
//! registry that only lives for that request.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   Prometheus    │────>│   HTTP Server   │────>│    dump1090     │
//! │ ?target=host:80 │<────│ (per-request    │<────│ /dump1090/      │
//! └─────────────────┘     │    registry)    │     │    data.json    │
//!                         └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! dump1090-exporter --listen-address :9190
//! curl 'http://localhost:9190/metrics?target=192.168.1.20:8080'
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod http;
pub mod mapping;
pub mod scrape;

pub use collector::{AircraftMetrics, ObserveSummary};
pub use config::{ConfigError, ExporterConfig, LogFormat, LoggingConfig};
pub use http::HttpServer;
pub use scrape::{ScrapeError, scrape_target};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
    }
    .map_err(|e| ConfigError::Logging(e.to_string()))
}
