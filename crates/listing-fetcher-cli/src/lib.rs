//! Command-line front end for listing-fetcher.

pub mod commands;
pub mod output;
pub mod targets;
