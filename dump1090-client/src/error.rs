//! Error types for the dump1090 client.

use thiserror::Error;

/// Result type alias using [`ClientError`].
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to a dump1090 receiver.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The receiver address is not a usable absolute URL.
    #[error("Invalid target address '{address}': {reason}")]
    InvalidTargetAddress { address: String, reason: String },

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Connection failure, timeout or interrupted body transfer.
    #[error("Upstream {url} is unreachable: {source}")]
    UpstreamUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The receiver answered with a non-2xx status.
    #[error("Upstream {url} returned HTTP {status}")]
    UpstreamHttpError { url: String, status: u16 },

    /// The body is not a JSON array of aircraft records.
    #[error("Malformed payload from {url}: {source}")]
    MalformedUpstreamPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Create an invalid target address error.
    pub fn invalid_target(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTargetAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from the operator-supplied address rather than
    /// from the receiver itself.
    pub fn is_target_error(&self) -> bool {
        matches!(self, Self::InvalidTargetAddress { .. })
    }

    /// Whether the failure was a timeout, either the client ceiling or a
    /// caller-supplied budget.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::UpstreamUnreachable { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
