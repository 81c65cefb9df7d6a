//! `license-plist`: collect the licenses of an app's dependencies into a
//! Settings.bundle plist, plus optional Markdown and HTML.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and load the config rules ([`config::load_config`]).
//! 2. Load CocoaPods, Carthage, Mint, SwiftPM, and config-declared libraries ([`loader`]).
//! 3. Merge, deduplicate, and sort them ([`aggregate`]).
//! 4. Stop early when nothing changed since the last run ([`summary`]).
//! 5. Fetch GitHub licenses with bounded concurrency ([`fetch`]).
//! 6. Report missing licenses and render every output ([`report`]).
//! 7. Exit `0`, or `1` on failure or on missing licenses with `--fail-if-missing-license`.

mod aggregate;
mod cli;
mod config;
mod error;
mod fetch;
mod license;
mod loader;
mod models;
mod pipeline;
mod report;
mod summary;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::Cli;
use config::load_config;
use fetch::github::GitHubFetcher;
use pipeline::RunOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    info!("license-plist v{}", env!("CARGO_PKG_VERSION"));

    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config_path = cli.config_path(&path);
    let config = match load_config(&path, config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };
    let settings = cli.settings(&path, &config);
    let fetcher = GitHubFetcher::new()?;

    let outcome = match pipeline::run(&settings, &config, &fetcher).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    if let RunOutcome::Completed(report) = outcome {
        if !cli.quiet {
            report::terminal::render(
                &report.records,
                &report.missing,
                &path,
                settings.flags.add_version_numbers,
            );
        }
        if report.failed_missing {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// `LICENSE_PLIST_LOG` overrides the level picked from `--verbose` / `--quiet`.
fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_env("LICENSE_PLIST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
