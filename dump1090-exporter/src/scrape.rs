//! One scrape: fetch a receiver's aircraft and render them as metrics.

use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use dump1090_client::{ClientError, Dump1090Client, REQUEST_TIMEOUT};
use thiserror::Error;
use tracing::{debug, warn};

use crate::collector::{AircraftMetrics, ObserveSummary};

/// Header Prometheus sends with the scrape timeout in seconds.
pub const SCRAPE_TIMEOUT_HEADER: &str = "x-prometheus-scrape-timeout-seconds";

/// Shortest fetch budget derived from the scrape timeout header.
const MIN_FETCH_BUDGET: Duration = Duration::from_millis(100);

/// Errors that end a scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Target parameter is missing")]
    MissingTarget,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] std::fmt::Error),
}

impl ScrapeError {
    /// HTTP status reported to the collector.
    pub fn status(&self) -> StatusCode {
        match self {
            ScrapeError::MissingTarget => StatusCode::BAD_REQUEST,
            ScrapeError::Client(e) if e.is_target_error() => StatusCode::BAD_REQUEST,
            ScrapeError::Client(_) | ScrapeError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body. Upstream details stay in the log.
    pub fn public_message(&self) -> &'static str {
        match self {
            ScrapeError::MissingTarget => "Target parameter is missing",
            ScrapeError::Client(e) if e.is_target_error() => "Target parameter is wrong",
            ScrapeError::Client(_) => "Failed to get data from dump1090",
            ScrapeError::Encode(_) => "Failed to encode metrics",
        }
    }
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> Response {
        (self.status(), format!("{}\n", self.public_message())).into_response()
    }
}

/// A rendered scrape.
#[derive(Debug)]
pub struct Scrape {
    pub body: String,
    pub summary: ObserveSummary,
}

/// Return the target, rejecting absent or empty values.
pub fn require_target(target: Option<&str>) -> Result<&str, ScrapeError> {
    match target.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(ScrapeError::MissingTarget),
    }
}

/// Fetch budget derived from the collector's scrape timeout header.
///
/// Returns `None` if the header is absent or unusable, leaving the client
/// ceiling in charge.
pub fn fetch_budget(headers: &HeaderMap, offset: Duration) -> Option<Duration> {
    let seconds: f64 = headers
        .get(SCRAPE_TIMEOUT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }

    let timeout = Duration::from_secs_f64(seconds.min(REQUEST_TIMEOUT.as_secs_f64()));
    Some(timeout.saturating_sub(offset).max(MIN_FETCH_BUDGET))
}

/// Scrape one receiver.
///
/// The client, registry and gauges live only for this call.
pub async fn scrape_target(target: &str, budget: Option<Duration>) -> Result<Scrape, ScrapeError> {
    let client = Dump1090Client::for_target(target)?;

    let records = match budget {
        Some(budget) => client.fetch_records_within(budget).await?,
        None => client.fetch_records().await?,
    };

    let mut metrics = AircraftMetrics::new();
    let summary = metrics.observe_all(&records);
    let body = metrics.render()?;

    debug!(
        upstream = %target,
        observed = summary.observed,
        skipped = summary.skipped,
        "Scrape complete"
    );

    Ok(Scrape { body, summary })
}

/// Log a failed scrape with its full cause chain.
pub fn log_failure(target: Option<&str>, err: &ScrapeError) {
    let target = target.unwrap_or_default();
    match err.status() {
        StatusCode::BAD_REQUEST => debug!(upstream = %target, error = %err, "Rejected scrape"),
        _ => warn!(upstream = %target, error = %error_chain(err), "Scrape failed"),
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_str = cause.to_string();
        if !out.contains(&cause_str) {
            out.push_str(": ");
            out.push_str(&cause_str);
        }
        source = cause.source();
    }
    out
}
