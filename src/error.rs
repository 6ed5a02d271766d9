//! Errors raised while fetching Function App records.
//!
//! Classification itself never fails; only the transport layer does.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("access token rejected by {url} (HTTP {status}); obtain a fresh one with `az account get-access-token`")]
    Unauthorized { status: u16, url: String },

    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("paging through {url} did not terminate: {reason}")]
    PagingLoop { url: String, reason: String },

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to read snapshot {}: {source}", .path.display())]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {}: {source}", .path.display())]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http { status, .. } => *status == 429 || *status >= 500,
            FetchError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        let throttled = FetchError::Http {
            status: 429,
            url: "https://management.azure.com".to_string(),
            message: String::new(),
        };
        assert!(throttled.is_transient());

        let not_found = FetchError::Http {
            status: 404,
            url: "https://management.azure.com".to_string(),
            message: String::new(),
        };
        assert!(!not_found.is_transient());

        let unauthorized = FetchError::Unauthorized {
            status: 401,
            url: "https://management.azure.com".to_string(),
        };
        assert!(!unauthorized.is_transient());
        assert!(unauthorized.to_string().contains("az account get-access-token"));
    }
}
