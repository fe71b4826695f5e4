// src/report.rs
// =============================================================================
// The end-of-run summary: what was crawled, collected, downloaded, archived.
//
// Printed either as a human-readable table or, with --json, as JSON on
// stdout (logs go to stderr, so the JSON stays machine-readable).
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use crate::archive::{DownloadFailure, PipelineReport};
use crate::config::HarvestConfig;
use crate::crawl::{CrawlFailure, CrawlOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: String,
    pub origin: String,
    pub urls_visited: usize,
    pub pages_crawled: usize,
    pub files_collected: usize,
    pub files_downloaded: usize,
    pub files_archived: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    pub crawl_failures: Vec<CrawlFailure>,
    pub download_failures: Vec<DownloadFailure>,
}

impl RunSummary {
    pub fn new(config: &HarvestConfig, crawl: &CrawlOutcome, pipeline: &PipelineReport) -> Self {
        Self {
            seed: config.seed.to_string(),
            origin: config.origin.to_string(),
            urls_visited: crawl.crawl_order.len(),
            pages_crawled: crawl.pages_crawled,
            files_collected: crawl.collected.len(),
            files_downloaded: pipeline.downloaded,
            files_archived: pipeline.archive.as_ref().map_or(0, |a| a.entries.len()),
            archive: pipeline
                .archive
                .as_ref()
                .map(|a| a.path.display().to_string()),
            crawl_failures: crawl.failures.clone(),
            download_failures: pipeline.failures.clone(),
        }
    }

    pub fn failed(&self) -> usize {
        self.crawl_failures.len() + self.download_failures.len()
    }

    /// Exit code for the process: 0 with an archive, 1 when nothing was collected
    pub fn exit_code(&self) -> i32 {
        if self.archive.is_some() {
            0
        } else {
            1
        }
    }

    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
        } else {
            self.print_table();
        }
        Ok(())
    }

    fn print_table(&self) {
        println!();
        for failure in &self.crawl_failures {
            println!("❌ {:<60} {}", truncate(&failure.url, 60), failure.error);
        }
        for failure in &self.download_failures {
            println!("⚠️  {:<60} {}", truncate(&failure.url, 60), failure.error);
        }

        println!("📊 Summary for {}:", self.origin);
        println!("   🔗 URLs visited: {}", self.urls_visited);
        println!("   📄 Pages crawled: {}", self.pages_crawled);
        println!("   📎 Files collected: {}", self.files_collected);
        println!("   ⬇️  Files downloaded: {}", self.files_downloaded);
        println!("   ❌ Failed: {}", self.failed());

        match &self.archive {
            Some(path) => println!("✅ {} file(s) archived in {}", self.files_archived, path),
            None => println!("📭 Nothing collected, no archive written"),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max - 3).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
