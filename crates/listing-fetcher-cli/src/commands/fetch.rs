//! `listing-fetcher fetch`: fetch targets in sequence and report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use listing_fetcher::{
    FailureSink, FanoutSink, FetchOutcome, Fetcher, FetcherConfig, JsonlSink, ReqwestTransport,
    TracingSink,
};

use crate::output::{format_bytes, print_json};
use crate::targets::collect_targets;

/// Options for one `fetch` run.
#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub urls: Vec<String>,
    pub file: Option<PathBuf>,
    /// Overrides `timeout_ms` from the config.
    pub timeout_ms: Option<u64>,
    pub failure_log: Option<PathBuf>,
    pub json: bool,
    pub print_body: bool,
}

/// Per-target line of the run report.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub url: String,
    pub fetched: bool,
    pub status: Option<u16>,
    pub bytes: Option<usize>,
    pub elapsed_ms: Option<u64>,
    pub kind: Option<String>,
    pub reason: Option<String>,
}

impl TargetReport {
    fn new(url: &str, outcome: &FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Fetched(page) => Self {
                url: url.to_string(),
                fetched: true,
                status: Some(page.status),
                bytes: Some(page.body.len()),
                elapsed_ms: Some(page.elapsed_ms),
                kind: None,
                reason: None,
            },
            FetchOutcome::NoResult(failure) => Self {
                url: url.to_string(),
                fetched: false,
                status: failure.status(),
                bytes: None,
                elapsed_ms: None,
                kind: Some(failure.kind_label().to_string()),
                reason: Some(failure.to_string()),
            },
        }
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub total: usize,
    pub fetched: usize,
    pub no_result: usize,
    pub targets: Vec<TargetReport>,
}

impl RunReport {
    pub fn from_results(results: &[(String, FetchOutcome)]) -> Self {
        let targets: Vec<TargetReport> = results
            .iter()
            .map(|(url, outcome)| TargetReport::new(url, outcome))
            .collect();
        let fetched = targets.iter().filter(|t| t.fetched).count();
        Self {
            total: targets.len(),
            fetched,
            no_result: targets.len() - fetched,
            targets,
        }
    }
}

/// Build a fetcher from the effective config plus command-line overrides.
pub fn build_fetcher(config: &FetcherConfig, args: &FetchArgs) -> Result<Fetcher> {
    let mut config = config.clone();
    if let Some(ms) = args.timeout_ms {
        config.timeout_ms = ms;
    }

    let transport = Arc::new(ReqwestTransport::new()?);

    let tracing_sink: Arc<dyn FailureSink> = Arc::new(TracingSink);
    let mut sink = FanoutSink::new(vec![tracing_sink]);
    if let Some(path) = &args.failure_log {
        let log = JsonlSink::open(path)
            .with_context(|| format!("failed to open failure log: {}", path.display()))?;
        sink.push(Arc::new(log));
    }

    let fetcher = Fetcher::from_config(transport, &config)?.with_sink(Arc::new(sink));
    Ok(fetcher)
}

/// Fetch every target once, in order, and print the outcome.
///
/// Failed targets do not make this return `Err`; only bad input does.
pub async fn run(config: &FetcherConfig, args: &FetchArgs) -> Result<RunReport> {
    let targets = collect_targets(&args.urls, args.file.as_deref())?;
    let fetcher = build_fetcher(config, args)?;

    let results = fetcher.fetch_all(&targets).await;
    let report = RunReport::from_results(&results);

    if args.json {
        print_json(&report);
    } else {
        print_human(&results, &report, args.print_body);
    }
    Ok(report)
}

fn print_human(results: &[(String, FetchOutcome)], report: &RunReport, print_body: bool) {
    for (url, outcome) in results {
        match outcome {
            FetchOutcome::Fetched(page) => {
                println!(
                    "  ok         {url}  ({}, {}, {} ms)",
                    page.status,
                    format_bytes(page.body.len()),
                    page.elapsed_ms
                );
                if print_body {
                    println!("{}", page.body);
                }
            }
            FetchOutcome::NoResult(failure) => {
                println!("  no result  {url}  ({})", failure.kind_label());
            }
        }
    }
    println!();
    println!(
        "  {} fetched, {} no result ({} total)",
        report.fetched, report.no_result, report.total
    );
}
