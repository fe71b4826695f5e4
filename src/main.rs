// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and validate them into a HarvestConfig
// 2. Crawl the site, collecting every non-HTML resource
// 3. Download the collected files and pack them into one ZIP
// 4. Print a summary and exit (0 = archive written, 1 = nothing collected,
//    2 = error before the crawl could start)
// =============================================================================

mod archive;     // src/archive/ - download & ZIP pipeline
mod classify;    // src/classify/ - page vs file, extensions, names
mod cli;         // src/cli.rs - command-line parsing
mod config;      // src/config.rs - validated run configuration
mod crawl;       // src/crawl/ - frontier and crawl engine
mod error;       // src/error.rs - error taxonomy
mod fetch;       // src/fetch/ - HTTP and link extraction
mod report;      // src/report.rs - end-of-run summary

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use archive::PipelineReport;
use cli::Cli;
use config::HarvestConfig;
use fetch::HttpFetcher;
use report::RunSummary;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Invalid seed/origin is the one fatal error, caught before any request
    let config = HarvestConfig::from_cli(&cli)?;

    let summary = harvest(&config).await?;
    summary.print(cli.json)?;

    Ok(summary.exit_code())
}

/// One full run: crawl, then download and archive whatever was collected
async fn harvest(config: &HarvestConfig) -> Result<RunSummary> {
    let fetcher = HttpFetcher::new(config)?;

    let mut outcome = crawl::crawl_site(&fetcher, &config.seed, &config.origin, config.max_depth).await;

    let pipeline = if outcome.collected.is_empty() {
        info!("No files found during crawling.");
        PipelineReport::default()
    } else {
        archive::package_files(&fetcher, &mut outcome.collected, config).await?
    };

    if pipeline.archive.is_some() {
        info!("Crawl complete, ZIP file is ready for download.");
    }

    Ok(RunSummary::new(config, &outcome, &pipeline))
}

// Logs go to stderr so --json output on stdout stays clean.
// RUST_LOG overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
