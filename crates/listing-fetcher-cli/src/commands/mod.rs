//! Subcommand implementations for the `listing-fetcher` binary.

pub mod check_config;
pub mod fetch;
pub mod identity;
