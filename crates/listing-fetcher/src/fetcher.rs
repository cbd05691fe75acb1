//! The fetcher: one GET per listing page, never fatal.
//!
//! Each call samples a fresh [`RequestIdentity`](crate::RequestIdentity),
//! sends exactly one request through the injected [`Transport`], and turns
//! anything other than HTTP 200 into [`FetchOutcome::NoResult`] after
//! handing a [`FailureRecord`] to the sink. There are no retries, no
//! backoff and no state carried between calls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{FetcherConfig, DEFAULT_TIMEOUT_MS};
use crate::error::{ConfigError, FetchFailure};
use crate::identity::IdentityPool;
use crate::sink::{FailureSink, TracingSink};
use crate::transport::{Transport, TransportRequest};
use crate::types::{FailureRecord, FetchOutcome, FetchedPage};

/// Fetches listing pages with a rotating browser identity.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    pool: IdentityPool,
    sink: Arc<dyn FailureSink>,
    timeout: Duration,
}

impl Fetcher {
    /// Fetcher with the default 10 s timeout and failures logged via `tracing`.
    pub fn new(transport: Arc<dyn Transport>, pool: IdentityPool) -> Self {
        Self {
            transport,
            pool,
            sink: Arc::new(TracingSink),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Fetcher configured from a validated [`FetcherConfig`].
    pub fn from_config(
        transport: Arc<dyn Transport>,
        config: &FetcherConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(transport, config.identity_pool()?).with_timeout(config.timeout()))
    }

    pub fn with_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn pool(&self) -> &IdentityPool {
        &self.pool
    }

    /// Fetch one listing page.
    ///
    /// Returns the body on HTTP 200. Every other status and every transport
    /// error is recorded once and returned as `NoResult`.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let identity = self.pool.draw();

        info!(url, "fetching listing page");
        debug!(
            url,
            user_agent = %identity.user_agent,
            accept_language = %identity.accept_language,
            referer = %identity.referer,
            "request identity"
        );

        let request = TransportRequest {
            url: url.to_string(),
            headers: identity.headers(),
            timeout: self.timeout,
        };

        let started = Instant::now();
        let response = self.transport.get(&request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match response {
            Ok(resp) if resp.status == 200 => {
                debug!(
                    url,
                    status = resp.status,
                    bytes = resp.body.len(),
                    elapsed_ms,
                    "listing page fetched"
                );
                FetchOutcome::Fetched(FetchedPage {
                    url: url.to_string(),
                    final_url: resp.final_url,
                    status: resp.status,
                    body: resp.body,
                    elapsed_ms,
                })
            }
            Ok(resp) => self.no_result(FetchFailure::from_status(url, resp.status)),
            Err(err) => self.no_result(FetchFailure::Transport {
                url: url.to_string(),
                kind: err.kind,
                message: err.message,
            }),
        }
    }

    /// Fetch each URL in order, one at a time.
    ///
    /// A failed target never stops the run; it shows up as `NoResult` in its
    /// slot. Output order matches input order.
    pub async fn fetch_all<I, S>(&self, urls: I) -> Vec<(String, FetchOutcome)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = Vec::new();
        for url in urls {
            let url = url.as_ref();
            let outcome = self.fetch(url).await;
            results.push((url.to_string(), outcome));
        }

        let fetched = results.iter().filter(|(_, o)| o.is_fetched()).count();
        info!(
            total = results.len(),
            fetched,
            no_result = results.len() - fetched,
            "run finished"
        );
        results
    }

    fn no_result(&self, failure: FetchFailure) -> FetchOutcome {
        self.sink.record(&FailureRecord::from_failure(&failure));
        FetchOutcome::NoResult(failure)
    }
}
