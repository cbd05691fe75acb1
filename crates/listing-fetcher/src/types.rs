//! Outcome types returned by the fetcher.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::FetchFailure;

/// A listing page that came back with HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL as requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    /// Response body, unmodified.
    pub body: String,
    pub elapsed_ms: u64,
}

/// Result of one fetch attempt. Failure is a value, never a panic or `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(FetchedPage),
    NoResult(FetchFailure),
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(page) => Some(&page.body),
            FetchOutcome::NoResult(_) => None,
        }
    }

    pub fn into_body(self) -> Option<String> {
        match self {
            FetchOutcome::Fetched(page) => Some(page.body),
            FetchOutcome::NoResult(_) => None,
        }
    }

    pub fn page(&self) -> Option<&FetchedPage> {
        match self {
            FetchOutcome::Fetched(page) => Some(page),
            FetchOutcome::NoResult(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::NoResult(failure) => Some(failure),
        }
    }
}

/// One failed attempt, as handed to a [`crate::FailureSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub url: String,
    pub status: Option<u16>,
    pub kind: String,
    pub message: String,
}

impl FailureRecord {
    pub fn from_failure(failure: &FetchFailure) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            url: failure.url().to_string(),
            status: failure.status(),
            kind: failure.kind_label().to_string(),
            message: failure.to_string(),
        }
    }
}
