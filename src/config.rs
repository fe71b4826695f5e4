// src/config.rs
// =============================================================================
// Validated run configuration.
//
// `Cli` holds whatever the user typed; `HarvestConfig` holds what we are
// actually going to do. Converting one into the other is where invalid seed
// URLs and origins are caught, which is the only fatal error class of a run.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::cli::Cli;
use crate::crawl::Origin;
use crate::error::{HarvestError, Result};

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub seed: Url,
    pub origin: Origin,
    pub delay: Duration,
    pub timeout: Duration,
    pub max_depth: Option<usize>,
    pub staging_dir: PathBuf,
    pub output: PathBuf,
    pub download_jobs: usize,
    pub user_agent: String,
}

impl HarvestConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let seed = parse_http_url(&cli.seed_url)?;

        // The origin override only contributes its scheme and host
        let origin = match &cli.origin {
            Some(raw) => Origin::from_url(&parse_http_url(raw)?)?,
            None => Origin::from_url(&seed)?,
        };

        let user_agent = cli
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("site-harvester/{}", env!("CARGO_PKG_VERSION")));

        Ok(Self {
            seed,
            origin,
            delay: Duration::from_millis(cli.delay_ms),
            timeout: Duration::from_secs(cli.timeout_secs),
            max_depth: cli.max_depth,
            staging_dir: cli.staging_dir.clone(),
            output: cli.output.clone(),
            download_jobs: usize::from(cli.download_jobs.max(1)),
            user_agent,
        })
    }
}

/// Parses an absolute http(s) URL, rejecting anything else as a config error
pub fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| HarvestError::Config(format!("invalid URL '{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(HarvestError::Config(format!(
            "unsupported scheme '{}' in '{}' (expected http or https)",
            url.scheme(),
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(HarvestError::Config(format!("URL has no host: {}", raw)));
    }

    Ok(url)
}
