// src/archive/download.rs
// =============================================================================
// Downloading collected files into the staging directory.
//
// Each file is its own unit of work: a failed fetch or a failed write is
// logged, recorded, and the next file is attempted. Successful downloads get
// their final name (extension resolved from the bytes or the Content-Type)
// and a `local_path` pointing into staging.
//
// With more than one job, fetches overlap via `buffered`, which still hands
// results back in registry order, so naming stays deterministic.
// =============================================================================

use std::collections::HashSet;
use std::path::Path;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::{finalize_name, has_known_extension, resolve_extension};
use crate::crawl::CollectedFile;
use crate::error::{HarvestError, Result};
use crate::fetch::{FetchedResource, HttpFetcher};

#[derive(Debug, Clone, Serialize)]
pub struct DownloadFailure {
    pub url: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub failures: Vec<DownloadFailure>,
    /// The staging directory did not exist before this run
    pub created_staging: bool,
}

/// Fetches every collected file into `staging_dir`
///
/// Only failing to create the staging directory is an error; everything
/// per-file ends up in the report instead. A redirect is a per-file failure
/// too: the crawl only collects URLs that answered 2xx directly.
pub async fn download_all(
    fetcher: &HttpFetcher,
    files: &mut [CollectedFile],
    staging_dir: &Path,
    jobs: usize,
) -> Result<DownloadReport> {
    let created_staging = !staging_dir.exists();
    tokio::fs::create_dir_all(staging_dir)
        .await
        .map_err(|e| HarvestError::fs(staging_dir, e))?;

    let mut report = DownloadReport {
        created_staging,
        ..DownloadReport::default()
    };
    let mut used_names = HashSet::new();

    let urls: Vec<Url> = files.iter().map(|f| f.source_url.clone()).collect();
    let mut results = stream::iter(urls.into_iter().enumerate())
        .map(|(index, url)| async move { (index, fetcher.fetch(&url).await) })
        .buffered(jobs.max(1));

    while let Some((index, result)) = results.next().await {
        let file = &mut files[index];

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Error downloading {}: {}", file.source_url, e);
                report.failures.push(DownloadFailure {
                    url: file.source_url.to_string(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        let name = unique_name(&resolve_name(file, &fetched), &mut used_names);
        let path = staging_dir.join(&name);

        if let Err(e) = tokio::fs::write(&path, &fetched.body).await {
            let err = HarvestError::fs(&path, e);
            warn!("Error saving {}: {}", file.source_url, err);
            report.failures.push(DownloadFailure {
                url: file.source_url.to_string(),
                error: err.to_string(),
            });
            continue;
        }

        info!("Downloaded: {} ({} bytes)", name, fetched.body.len());
        file.resolved_name = name;
        file.local_path = Some(path);
        report.downloaded += 1;
    }

    Ok(report)
}

// Names that already end in a recognised extension are trusted as-is
fn resolve_name(file: &CollectedFile, fetched: &FetchedResource) -> String {
    if has_known_extension(&file.logical_name) {
        return file.logical_name.clone();
    }

    match resolve_extension(fetched.content_type.as_deref(), &fetched.body) {
        Some(ext) => finalize_name(&file.logical_name, ext),
        None => {
            let err = HarvestError::Classification {
                url: file.source_url.to_string(),
            };
            debug!("{}; keeping '{}'", err, file.logical_name);
            file.logical_name.clone()
        }
    }
}

/// `report.pdf`, then `report_2.pdf`, `report_3.pdf`, ...
///
/// Comparison ignores case so the staging directory behaves the same on
/// case-insensitive filesystems.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
        _ => (name, String::new()),
    };

    let mut counter = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, counter, ext);
        if used.insert(candidate.to_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}
