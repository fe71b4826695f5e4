// src/crawl/engine.rs
// =============================================================================
// This module implements the crawl itself: a depth-first walk of one origin.
//
// How it works:
// 1. Start with the seed URL on the frontier's stack
// 2. Pop a URL; skip it unless the frontier says it is new
// 3. Fetch it (the fetcher sleeps for the politeness delay first)
// 4. HTML page -> extract links, push the same-origin ones
//    Redirect -> the Location is one more link, same origin rule applies
//    Anything else -> record it as a collected file
// 5. Repeat until the stack is empty
//
// Each URL ends up Traversed, Redirected, Collected, Skipped or Failed. A
// failed fetch is logged and the walk carries on; nothing here aborts the run.
//
// The walk always terminates: every URL passes `enqueue_if_new` before it is
// fetched, so even a site full of cycles can only be fetched once per URL.
// =============================================================================

use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::frontier::{Frontier, Origin, PendingUrl};
use super::registry::CollectedFile;
use crate::classify::{classify, logical_name, Classification};
use crate::error::HarvestError;
use crate::fetch::{extract_links, HttpFetcher};

/// What happened to a single URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// HTML page whose links were followed
    Traversed,
    /// 3xx; the target went through the frontier like any other link
    Redirected,
    /// Non-HTML resource added to the registry
    Collected,
    /// Non-HTML resource with no file name (e.g. a directory URL)
    Skipped,
    Failed,
}

/// A URL that could not be fetched, and why
#[derive(Debug, Clone, Serialize)]
pub struct CrawlFailure {
    pub url: String,
    pub error: String,
}

/// Everything the crawl learned, handed to the download pipeline
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// URLs in the order they were fetched
    pub crawl_order: Vec<Url>,
    pub pages_crawled: usize,
    pub collected: Vec<CollectedFile>,
    pub failures: Vec<CrawlFailure>,
}

/// Crawls everything reachable from `seed` without leaving `origin`
///
/// `max_depth` limits link hops from the seed (None = no limit). Pages at
/// the limit are still fetched and classified, but their links are not
/// followed. A page later found by a shorter path has its links followed
/// then, without being fetched again.
pub async fn crawl_site(
    fetcher: &HttpFetcher,
    seed: &Url,
    origin: &Origin,
    max_depth: Option<usize>,
) -> CrawlOutcome {
    let mut frontier = Frontier::new(origin.clone());
    let mut outcome = CrawlOutcome::default();

    frontier.push_seed(seed.clone());
    info!(seed = %seed, origin = %frontier.origin(), "Starting crawl");

    while let Some(pending) = frontier.pop() {
        if !frontier.enqueue_if_new(&pending.url) {
            if let Some(limit) = max_depth {
                let queued = frontier.reach_again(&pending, limit);
                if queued > 0 {
                    debug!(url = %pending.url, depth = pending.depth, queued, "shorter path found, links re-queued");
                }
            }
            continue;
        }

        info!(
            "Crawling: {} (Visited: {}, Files: {})",
            pending.url,
            frontier.visited_count(),
            outcome.collected.len()
        );
        outcome.crawl_order.push(pending.url.clone());

        let result = visit(fetcher, &mut frontier, &mut outcome, &pending, max_depth).await;
        debug!(url = %pending.url, outcome = ?result, "visited");
    }

    info!(
        pages = outcome.pages_crawled,
        files = outcome.collected.len(),
        failed = outcome.failures.len(),
        "Crawl finished"
    );

    outcome
}

async fn visit(
    fetcher: &HttpFetcher,
    frontier: &mut Frontier,
    outcome: &mut CrawlOutcome,
    pending: &PendingUrl,
    max_depth: Option<usize>,
) -> VisitOutcome {
    let fetched = match fetcher.fetch(&pending.url).await {
        Ok(fetched) => fetched,
        Err(HarvestError::Redirect { location, .. }) => {
            // A redirect is not a hop the user sees, so the target keeps this depth
            let queued = frontier.push_links(vec![location.clone()], pending.depth);
            if queued == 0 {
                info!("Not following redirect: {} -> {}", pending.url, location);
            } else {
                debug!(url = %pending.url, target = %location, "redirect queued");
            }
            return VisitOutcome::Redirected;
        }
        Err(e) => {
            warn!("Error crawling {}: {}", pending.url, e);
            outcome.failures.push(CrawlFailure {
                url: pending.url.to_string(),
                error: e.to_string(),
            });
            return VisitOutcome::Failed;
        }
    };

    match classify(fetched.content_type.as_deref(), &fetched.body) {
        Classification::Traversable => {
            outcome.pages_crawled += 1;

            let html = decode_html(&fetched.url, &fetched.body);
            let links = extract_links(&html, &fetched.url);
            let found = links.len();

            if let Some(limit) = max_depth {
                frontier.remember_links(&pending.url, pending.depth, &links);
                if pending.depth >= limit {
                    debug!(url = %pending.url, depth = pending.depth, "depth limit reached, not following links");
                    return VisitOutcome::Traversed;
                }
            }

            let queued = frontier.push_links(links, pending.depth + 1);
            debug!(url = %pending.url, status = fetched.status, found, queued, "links extracted");

            VisitOutcome::Traversed
        }
        Classification::Collectible => match logical_name(&pending.url) {
            Some(name) => {
                debug!(
                    url = %pending.url,
                    name = %name,
                    content_type = fetched.content_type.as_deref().unwrap_or("-"),
                    "collected"
                );
                outcome
                    .collected
                    .push(CollectedFile::new(pending.url.clone(), name));
                VisitOutcome::Collected
            }
            None => {
                debug!(url = %pending.url, "non-HTML resource without a file name, skipping");
                VisitOutcome::Skipped
            }
        },
    }
}

// Pages that are not valid UTF-8 are still scanned, with bad bytes replaced
fn decode_html(url: &Url, body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(e) => {
            let err = HarvestError::Parse {
                url: url.to_string(),
                reason: e.to_string(),
            };
            warn!("{}; continuing with lossy decoding", err);
            String::from_utf8_lossy(body).into_owned()
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a stack instead of recursion?
//    - A recursive crawl uses one stack frame per link hop
//    - A deep site (page 1 -> page 2 -> ... -> page 10000) would overflow
//    - A Vec used as a stack lives on the heap and grows as needed
//
// 2. Why `&mut Frontier` and `&mut CrawlOutcome` in visit()?
//    - crawl_site owns both for the whole run
//    - visit() borrows them mutably for one URL, then gives them back
//    - No globals, no Rc<RefCell<...>>: the borrow checker proves only
//      one piece of code changes them at a time
//
// 3. Why does a failed fetch return a value instead of an error?
//    - One broken link must not stop the crawl
//    - Turning the error into VisitOutcome::Failed makes that explicit
// -----------------------------------------------------------------------------
