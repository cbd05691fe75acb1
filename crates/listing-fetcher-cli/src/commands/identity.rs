//! `listing-fetcher identity`: show what a request will look like.

use anyhow::Result;

use listing_fetcher::{FetcherConfig, RequestIdentity};

use crate::output::print_json;

/// Sample `count` identities from the configured pool and print them as JSON.
pub fn run(config: &FetcherConfig, count: usize) -> Result<Vec<RequestIdentity>> {
    let pool = config.identity_pool()?;
    let identities: Vec<RequestIdentity> = (0..count).map(|_| pool.draw()).collect();
    print_json(&identities);
    Ok(identities)
}
