// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Depth-first crawling from a seed URL, without recursion
// - Exact same-origin restriction (scheme + host)
// - Every URL fetched at most once, even across link cycles
// - Non-HTML resources are recorded as files to collect
//
// Rust concepts:
// - Async programming: each fetch is awaited in turn
// - Collections: HashSet for visited URLs, Vec as the work stack
// =============================================================================

mod engine;
mod frontier;
mod registry;

pub use engine::{crawl_site, CrawlFailure, CrawlOutcome};
pub use frontier::Origin;
pub use registry::CollectedFile;
