//! HTTP transport seam.
//!
//! The fetcher builds a complete [`TransportRequest`] and hands it to a
//! [`Transport`]. [`ReqwestTransport`] is the real network implementation;
//! tests and any future proxy-backed transport plug in behind the same trait.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Redirect hops followed before the last 3xx response is returned as-is.
pub const MAX_REDIRECTS: usize = 5;

/// A single GET to perform.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl TransportRequest {
    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What came back from the server.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Final URL after redirects.
    pub final_url: String,
    pub status: u16,
    /// Decoded response text. Empty when a non-success body could not be read.
    pub body: String,
}

/// Coarse classification of network-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    InvalidUrl,
    Body,
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::InvalidUrl => "invalid_url",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request did not produce a usable response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Something that can perform a GET.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`.
///
/// The client carries no default user agent; every header comes from the
/// request's identity.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::custom(|attempt| {
                if attempt.previous().len() > MAX_REDIRECTS {
                    attempt.stop()
                } else {
                    attempt.follow()
                }
            }))
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Other, error_chain(&e)))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| {
            TransportError::new(TransportErrorKind::InvalidUrl, format!("{}: {e}", request.url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::new(
                TransportErrorKind::InvalidUrl,
                format!("unsupported scheme: {}", url.scheme()),
            ));
        }

        let mut builder = self.client.get(url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder.send().await.map_err(|e| classify(&e))?;
        let status = resp.status();
        let final_url = resp.url().to_string();

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(classify(&e)),
            Err(e) => {
                // The status alone decides a failed fetch.
                tracing::debug!(status = status.as_u16(), "discarding unreadable body: {e}");
                String::new()
            }
        };

        Ok(TransportResponse {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

fn classify(err: &reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, error_chain(err))
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
