// src/crawl/frontier.rs
// =============================================================================
// The URL frontier: what we have seen, and what is still waiting.
//
// Two invariants live here:
// - Same origin: only URLs whose scheme and host exactly match the crawl's
//   Origin are ever pushed. This is an equality check on parsed components,
//   so `http://x.test.evil.com` is NOT inside `http://x.test`.
// - No revisits: `enqueue_if_new` is the one gate every URL passes before it
//   is fetched. It answers true exactly once per URL for the whole run; the
//   visited set only ever grows.
//
// Pending work is a stack (Vec), which gives depth-first order without
// recursion. Links from one page are pushed in reverse so they come back out
// in the order they appeared on the page.
//
// Under a depth limit, depth-first order can reach a page by a long path
// before a short one. The frontier remembers each page's links and the
// shallowest depth it was reached at, so a shorter path found later
// re-expands the page from memory instead of fetching it again.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::fmt;

use url::Url;

use crate::error::{HarvestError, Result};

/// The scheme + host pair that bounds a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    host: String,
}

impl Origin {
    pub fn from_url(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| HarvestError::Config(format!("URL has no host: {}", url)))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
        })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// True iff the URL's scheme and host are exactly the origin's
///
/// The url crate lowercases schemes and hosts while parsing, so a plain
/// string comparison of the parsed parts is enough.
pub fn belongs_to_origin(url: &Url, origin: &Origin) -> bool {
    url.scheme() == origin.scheme && url.host_str() == Some(origin.host.as_str())
}

/// A URL waiting to be fetched, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUrl {
    pub url: Url,
    pub depth: usize,
}

// A traversed page as seen under a depth limit
#[derive(Debug)]
struct PageLinks {
    depth: usize,
    links: Vec<Url>,
}

#[derive(Debug)]
pub struct Frontier {
    origin: Origin,
    visited: HashSet<String>,
    pending: Vec<PendingUrl>,
    pages: HashMap<String, PageLinks>,
}

impl Frontier {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            visited: HashSet::new(),
            pending: Vec::new(),
            pages: HashMap::new(),
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Marks the URL visited; true only the first time a URL is offered
    pub fn enqueue_if_new(&mut self, url: &Url) -> bool {
        self.visited.insert(dedup_key(url))
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&dedup_key(url))
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Queues the seed; it is admitted even if an origin override excludes it
    pub fn push_seed(&mut self, seed: Url) {
        self.pending.push(PendingUrl { url: seed, depth: 0 });
    }

    /// Queues the same-origin, not-yet-visited links of one page
    ///
    /// Returns how many links were queued. The same URL may be queued by
    /// several pages before it is visited; `enqueue_if_new` at pop time
    /// keeps it to one fetch.
    pub fn push_links(&mut self, links: Vec<Url>, depth: usize) -> usize {
        let accepted: Vec<Url> = links
            .into_iter()
            .filter(|url| belongs_to_origin(url, &self.origin) && !self.is_visited(url))
            .collect();

        let count = accepted.len();
        self.pending
            .extend(accepted.into_iter().rev().map(|url| PendingUrl { url, depth }));
        count
    }

    pub fn pop(&mut self) -> Option<PendingUrl> {
        self.pending.pop()
    }

    /// Keeps a traversed page's links so a shorter path can re-expand it
    pub fn remember_links(&mut self, page: &Url, depth: usize, links: &[Url]) {
        self.pages.insert(
            dedup_key(page),
            PageLinks {
                depth,
                links: links.to_vec(),
            },
        );
    }

    /// Handles an already-visited page popped again at `pending.depth`
    ///
    /// If that is shallower than any depth the page was reached at before,
    /// its remembered links are queued again one level down, visited or not,
    /// so their own depths get lowered too. Returns how many were queued.
    /// Depths only ever decrease, so this cannot loop.
    pub fn reach_again(&mut self, pending: &PendingUrl, max_depth: usize) -> usize {
        let Some(page) = self.pages.get_mut(&dedup_key(&pending.url)) else {
            return 0;
        };
        if pending.depth >= page.depth {
            return 0;
        }
        page.depth = pending.depth;
        if pending.depth >= max_depth {
            return 0;
        }

        let depth = pending.depth + 1;
        let accepted: Vec<Url> = page
            .links
            .iter()
            .filter(|url| belongs_to_origin(url, &self.origin))
            .cloned()
            .collect();

        let count = accepted.len();
        self.pending
            .extend(accepted.into_iter().rev().map(|url| PendingUrl { url, depth }));
        count
    }
}

// Fragments never change what the server sends back
fn dedup_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}
