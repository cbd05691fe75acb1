//! listing-fetcher: entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use listing_fetcher::load_config;
use listing_fetcher_cli::commands::{check_config, fetch, identity};

#[derive(Parser)]
#[command(
    name = "listing-fetcher",
    about = "listing-fetcher: fetch retail listing pages with rotating browser identities",
    version
)]
struct Cli {
    /// Path to a JSON config file.
    /// Falls back to $LISTING_FETCHER_CONFIG, then ./.listing-fetcher/config.json.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch each target URL once, in order.
    Fetch {
        /// Target URLs (listing or category pages).
        urls: Vec<String>,

        /// Read more targets from a file, one URL per line.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Per-request timeout in milliseconds (overrides the config).
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Append a JSON line per failed target to this file.
        #[arg(long)]
        failure_log: Option<PathBuf>,

        /// Print the run report as JSON.
        #[arg(long, conflicts_with = "print_body")]
        json: bool,

        /// Print each fetched body after its status line.
        #[arg(long)]
        print_body: bool,
    },

    /// Sample request identities from the configured pool.
    Identity {
        /// Number of identities to sample.
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u16).range(1..=100))]
        count: u16,
    },

    /// Load and validate the effective configuration.
    CheckConfig {
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   listing-fetcher completions bash > ~/.local/share/bash-completion/completions/listing-fetcher
    ///   listing-fetcher completions zsh > ~/.zfunc/_listing-fetcher
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Fetch {
            urls,
            file,
            timeout_ms,
            failure_log,
            json,
            print_body,
        } => {
            let (config, source) = load_config(cli.config.as_deref())?;
            tracing::debug!("config: {source}");
            let args = fetch::FetchArgs {
                urls,
                file,
                timeout_ms,
                failure_log,
                json,
                print_body,
            };
            fetch::run(&config, &args).await?;
        }

        Commands::Identity { count } => {
            let (config, _) = load_config(cli.config.as_deref())?;
            identity::run(&config, usize::from(count))?;
        }

        Commands::CheckConfig { json } => {
            let (config, source) = load_config(cli.config.as_deref())?;
            check_config::run(&config, &source, json)?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "listing-fetcher", &mut std::io::stdout());
        }
    }

    Ok(())
}
