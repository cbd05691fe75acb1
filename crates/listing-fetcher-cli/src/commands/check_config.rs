//! `listing-fetcher check-config`: validate the effective configuration.

use anyhow::Result;
use serde::Serialize;

use listing_fetcher::{ConfigSource, FetcherConfig};

use crate::output::print_json;

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub source: String,
    pub timeout_ms: u64,
    pub user_agents: usize,
    pub accept_languages: usize,
    pub referers: usize,
    pub accept_encoding: String,
}

/// Validate `config` and print where it came from and what it holds.
pub fn run(config: &FetcherConfig, source: &ConfigSource, json: bool) -> Result<ConfigSummary> {
    config.validate()?;
    let pool = config.identity_pool()?;

    let summary = ConfigSummary {
        source: source.to_string(),
        timeout_ms: config.timeout_ms,
        user_agents: pool.user_agents().len(),
        accept_languages: pool.accept_languages().len(),
        referers: pool.referers().len(),
        accept_encoding: pool.accept_encoding().to_string(),
    };

    if json {
        print_json(&summary);
    } else {
        println!("  Config OK: {}", summary.source);
        println!("  Timeout:          {} ms", summary.timeout_ms);
        println!("  User agents:      {}", summary.user_agents);
        println!("  Accept-Language:  {}", summary.accept_languages);
        println!("  Referers:         {}", summary.referers);
        println!("  Accept-Encoding:  {}", summary.accept_encoding);
    }
    Ok(summary)
}
