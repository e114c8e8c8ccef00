//! Configuration for the dump1090 exporter.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// HTTP endpoint settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-scrape settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to listen on (default: "0.0.0.0:9190").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for the scrape endpoint (default: "/metrics").
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_listen() -> String {
    "0.0.0.0:9190".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
        }
    }
}

/// Per-scrape configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Subtracted from the collector's scrape timeout header to leave time
    /// for rendering the response (milliseconds).
    #[serde(default = "default_timeout_offset_ms")]
    pub timeout_offset_ms: u64,
}

fn default_timeout_offset_ms() -> u64 {
    500
}

impl ScrapeConfig {
    pub fn timeout_offset(&self) -> Duration {
        Duration::from_millis(self.timeout_offset_ms)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_offset_ms: default_timeout_offset_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The listen address as a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        normalize_listen_address(&self.http.listen).parse().map_err(|_| {
            ConfigError::Validation(format!("Invalid listen address: {}", self.http.listen))
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        let path = &self.http.metrics_path;
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }
        // Both are served by the exporter itself.
        if path == "/" || path == "/health" {
            return Err(ConfigError::Validation(format!(
                "Metrics path {} is reserved",
                path
            )));
        }

        Ok(())
    }
}

/// Accept Go-style `:port` listen addresses, meaning all interfaces.
pub fn normalize_listen_address(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_config() {
        let config = ExporterConfig::parse("{}").unwrap();

        assert_eq!(config.http.listen, "0.0.0.0:9190");
        assert_eq!(config.http.metrics_path, "/metrics");
        assert_eq!(config.scrape.timeout_offset_ms, 500);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            http: {
                listen: "127.0.0.1:9191",
                metrics_path: "/aircraft",
            },
            scrape: { timeout_offset_ms: 250 },
            logging: {
                level: "debug",
                format: "json"
            }
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.http.listen, "127.0.0.1:9191");
        assert_eq!(config.http.metrics_path, "/aircraft");
        assert_eq!(config.scrape.timeout_offset(), Duration::from_millis(250));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:9191".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_validate_invalid_listen() {
        let json = r#"{ http: { listen: "not-an-address" } }"#;

        let result = ExporterConfig::parse(json);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_path() {
        let json = r#"{ http: { metrics_path: "no-leading-slash" } }"#;

        let result = ExporterConfig::parse(json);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must start with /")
        );
    }

    #[test]
    fn test_validate_reserved_path() {
        assert!(ExporterConfig::parse(r#"{ http: { metrics_path: "/" } }"#).is_err());
        assert!(ExporterConfig::parse(r#"{ http: { metrics_path: "/health" } }"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ http: {{ listen: \"127.0.0.1:9300\" }} }}").unwrap();

        let config = ExporterConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.http.listen, "127.0.0.1:9300");
    }

    #[test]
    fn test_load_missing_file() {
        let result = ExporterConfig::load_from_file("/nonexistent/dump1090-exporter.json5");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_port_only_listen() {
        let config = ExporterConfig::parse(r#"{ http: { listen: ":9190" } }"#).unwrap();

        assert_eq!(
            config.listen_addr().unwrap(),
            "0.0.0.0:9190".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_normalize_listen_address() {
        assert_eq!(normalize_listen_address(":9190"), "0.0.0.0:9190");
        assert_eq!(normalize_listen_address("127.0.0.1:9190"), "127.0.0.1:9190");
    }
}
