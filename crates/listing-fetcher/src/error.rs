//! Error types for fetching and configuration.

use crate::transport::TransportErrorKind;

/// Why a fetch produced no result.
///
/// These never escape [`crate::Fetcher::fetch`] as an `Err`; they travel
/// inside [`crate::FetchOutcome::NoResult`] after being handed to the
/// failure sink.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// 4xx/5xx, most often a 503 served to traffic the site flagged as a bot.
    #[error("Blocked or rate limited: {url} returned HTTP {status}")]
    Blocked { url: String, status: u16 },

    /// Any other status that is not 200.
    #[error("Unexpected status: {url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    /// The request never produced a usable response.
    #[error("Transport failure ({kind}) for {url}: {message}")]
    Transport {
        url: String,
        kind: TransportErrorKind,
        message: String,
    },
}

impl FetchFailure {
    /// Classify a non-200 status.
    pub fn from_status(url: &str, status: u16) -> Self {
        if (400..600).contains(&status) {
            FetchFailure::Blocked {
                url: url.to_string(),
                status,
            }
        } else {
            FetchFailure::UnexpectedStatus {
                url: url.to_string(),
                status,
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchFailure::Blocked { url, .. }
            | FetchFailure::UnexpectedStatus { url, .. }
            | FetchFailure::Transport { url, .. } => url,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchFailure::Blocked { status, .. } | FetchFailure::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            FetchFailure::Transport { .. } => None,
        }
    }

    /// Short machine-readable label used in failure records.
    pub fn kind_label(&self) -> &'static str {
        match self {
            FetchFailure::Blocked { .. } => "blocked",
            FetchFailure::UnexpectedStatus { .. } => "unexpected_status",
            FetchFailure::Transport { kind, .. } => kind.as_str(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, FetchFailure::Blocked { .. })
    }
}

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
