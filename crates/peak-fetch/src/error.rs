//! Error types for municipality lookup and downloads.

use thiserror::Error;

/// Errors that can occur while talking to GeoNorge or Overpass.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Request could not be sent or its body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("{service} returned HTTP {status}: {message}")]
    Http {
        /// Service that failed.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// An endpoint could not be turned into a request URL.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Parser message.
        message: String,
    },

    /// Response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// No municipality matches the query.
    #[error("municipality '{query}' not found")]
    MunicipalityNotFound {
        /// Number or name as given.
        query: String,
    },

    /// The name matches several municipalities.
    #[error("more than one municipality found: {}", .candidates.join(", "))]
    AmbiguousMunicipality {
        /// Name as given.
        query: String,
        /// `"<id> <name>"` of every match.
        candidates: Vec<String>,
    },
}

impl FetchError {
    /// Returns whether this error is potentially recoverable with a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl { .. }
            | Self::JsonParse(_)
            | Self::MunicipalityNotFound { .. }
            | Self::AmbiguousMunicipality { .. } => false,
        }
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
