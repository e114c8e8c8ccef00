//! HTTP client for a single dump1090 receiver.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::ACCEPT;
use tracing::{debug, trace};

use crate::aircraft::{Aircraft, RawAircraft, normalize};
use crate::error::{ClientError, Result};

/// Path of the aircraft list, relative to the receiver base URL.
pub const DATA_PATH: &str = "/dump1090/data.json";

/// Hard ceiling for every request issued by a [`Dump1090Client`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("dump1090-exporter/", env!("CARGO_PKG_VERSION"));

/// Client bound to one dump1090 receiver.
///
/// Fetches are plain futures: dropping the future returned by
/// [`fetch_records`](Self::fetch_records) aborts the in-flight request.
#[derive(Debug, Clone)]
pub struct Dump1090Client {
    base_url: Url,
    data_url: Url,
    http: reqwest::Client,
}

impl Dump1090Client {
    /// Create a client for an absolute `http`/`https` base URL.
    pub fn new(base: &str) -> Result<Self> {
        let base_url =
            Url::parse(base).map_err(|e| ClientError::invalid_target(base, e.to_string()))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::invalid_target(
                base,
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }
        if base_url.cannot_be_a_base() || !base_url.has_host() {
            return Err(ClientError::invalid_target(base, "missing host"));
        }

        let data_url = join_data_path(&base_url);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url,
            data_url,
            http,
        })
    }

    /// Create a client for a `host[:port]` target.
    ///
    /// Targets are always reached over plain HTTP. A target that carries its
    /// own scheme is rejected instead of being reinterpreted.
    pub fn for_target(target: &str) -> Result<Self> {
        if target.is_empty() {
            return Err(ClientError::invalid_target(target, "target is empty"));
        }
        if target.contains("://") {
            return Err(ClientError::invalid_target(
                target,
                "scheme not allowed, targets are always reached over http",
            ));
        }

        Self::new(&format!("http://{}", target))
    }

    /// The receiver base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The full URL of the aircraft list.
    pub fn data_url(&self) -> &Url {
        &self.data_url
    }

    /// Fetch and normalize the current aircraft list.
    ///
    /// Records keep the order of the upstream payload. Nothing is filtered.
    pub async fn fetch_records(&self) -> Result<Vec<Aircraft>> {
        self.fetch(None).await
    }

    /// Like [`fetch_records`](Self::fetch_records), bounded by `budget`.
    ///
    /// The budget can only shorten the request; [`REQUEST_TIMEOUT`] still applies.
    pub async fn fetch_records_within(&self, budget: Duration) -> Result<Vec<Aircraft>> {
        self.fetch(Some(budget.min(REQUEST_TIMEOUT))).await
    }

    async fn fetch(&self, budget: Option<Duration>) -> Result<Vec<Aircraft>> {
        let mut request = self
            .http
            .get(self.data_url.clone())
            .header(ACCEPT, "application/json");
        if let Some(budget) = budget {
            request = request.timeout(budget);
        }

        let response = request
            .send()
            .await
            .map_err(|source| self.unreachable(source))?;

        let status = response.status();
        debug!(
            url = %self.data_url,
            status = status.as_u16(),
            "Received dump1090 response"
        );

        if !status.is_success() {
            return Err(ClientError::UpstreamHttpError {
                url: self.data_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| self.unreachable(source))?;

        let raw: Vec<RawAircraft> = serde_json::from_slice(&body).map_err(|source| {
            ClientError::MalformedUpstreamPayload {
                url: self.data_url.to_string(),
                source,
            }
        })?;

        let records = normalize(raw);
        for aircraft in &records {
            trace!(
                hex = %aircraft.hex,
                flight = %aircraft.flight,
                squawk = %aircraft.squawk,
                valid_position = aircraft.valid_position,
                valid_track = aircraft.valid_track,
                "Aircraft record"
            );
        }

        debug!(
            url = %self.data_url,
            count = records.len(),
            "Fetched aircraft records"
        );

        Ok(records)
    }

    fn unreachable(&self, source: reqwest::Error) -> ClientError {
        ClientError::UpstreamUnreachable {
            url: self.data_url.to_string(),
            source,
        }
    }
}

/// Join the base path with [`DATA_PATH`], dropping any query or fragment.
fn join_data_path(base: &Url) -> Url {
    let mut url = base.clone();
    let path = format!("{}{}", base.path().trim_end_matches('/'), DATA_PATH);
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    url
}
