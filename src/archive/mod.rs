// src/archive/mod.rs
// =============================================================================
// The download & archive pipeline, run once after the crawl.
//
// Submodules:
// - download: fetch each collected file into the staging directory
// - writer: pack staged files into one ZIP and delete them
// =============================================================================

mod download;
mod writer;

use tracing::debug;

pub use download::DownloadFailure;
pub use writer::ArchiveReport;

use crate::config::HarvestConfig;
use crate::crawl::CollectedFile;
use crate::error::Result;
use crate::fetch::HttpFetcher;

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub downloaded: usize,
    pub failures: Vec<DownloadFailure>,
    /// None when nothing could be downloaded
    pub archive: Option<ArchiveReport>,
}

/// Downloads the collected files and packs them into `config.output`
///
/// Does nothing (not even creating the staging directory) for an empty
/// registry.
pub async fn package_files(
    fetcher: &HttpFetcher,
    files: &mut [CollectedFile],
    config: &HarvestConfig,
) -> Result<PipelineReport> {
    if files.is_empty() {
        return Ok(PipelineReport::default());
    }

    let downloads =
        download::download_all(fetcher, files, &config.staging_dir, config.download_jobs).await?;

    let archive = writer::write_archive(files, &config.output)?;

    // A directory the user already had stays; ours goes once it is empty
    if downloads.created_staging {
        if let Err(e) = std::fs::remove_dir(&config.staging_dir) {
            debug!(dir = %config.staging_dir.display(), error = %e, "staging directory left in place");
        }
    }

    Ok(PipelineReport {
        downloaded: downloads.downloaded,
        failures: downloads.failures,
        archive,
    })
}
