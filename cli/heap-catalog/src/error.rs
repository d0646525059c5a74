//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Common error type for catalog API operations.
///
/// Every operation of [crate::ClientTrait] fails with this type.
/// The client performs no recovery, errors are returned exactly as observed.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    /// The request could not complete (connectivity, DNS, timeout).
    #[error("could not reach the catalog API")]
    Transport(#[source] reqwest::Error),

    /// A response arrived with a non-success status.
    #[error("{0}")]
    RemoteApi(RemoteApiError),

    /// The response body did not have the expected shape.
    #[error("could not decode response from '{endpoint}'")]
    Decoding {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no username given and no default username configured")]
    MissingUsername,

    #[error("invalid catalog url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl CatalogClientError {
    /// Status code of a remote API error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogClientError::RemoteApi(err) => Some(err.status),
            _ => None,
        }
    }
}

/// A non-success HTTP response from the catalog API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApiError {
    pub status: StatusCode,
    pub status_text: String,
    /// Raw response body, kept for diagnostics.
    pub body: String,
}

impl RemoteApiError {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.into(),
        }
    }
}

impl std::fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "catalog API error: {} {}",
            self.status.as_u16(),
            self.status_text
        )
    }
}
