// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The CLI is deliberately flat: one positional seed URL plus a handful of
// knobs for politeness, output locations and reporting. The raw arguments are
// turned into a validated `HarvestConfig` (see config.rs) before any request
// is made, so a bad seed URL fails fast.
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "site-harvester",
    version,
    about = "Crawl one website, collect every linked file and pack them into a ZIP archive",
    long_about = "site-harvester walks every page reachable from a seed URL without leaving its origin. \
                  Anything that is not an HTML page is collected, downloaded and bundled into a single ZIP file."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com/docs/)
    pub seed_url: String,

    /// Restrict the crawl to this origin instead of the seed URL's scheme and host
    ///
    /// Example: --origin https://example.com
    #[arg(long)]
    pub origin: Option<String>,

    /// Pause before every request, in milliseconds
    #[arg(long, default_value_t = 4000)]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Maximum number of link hops from the seed (unbounded when omitted)
    ///
    /// Depth 0 = just the seed URL
    /// Depth 1 = the seed plus everything it links to
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Directory where files are staged before archiving
    #[arg(long, default_value = "crawled_files")]
    pub staging_dir: PathBuf,

    /// Path of the ZIP archive to produce
    #[arg(long, short, default_value = "crawled_files.zip")]
    pub output: PathBuf,

    /// How many collected files to download at once
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub download_jobs: u16,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Print the run summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Show debug-level log output
    #[arg(long, short)]
    pub verbose: bool,
}
