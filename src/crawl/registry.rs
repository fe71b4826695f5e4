// src/crawl/registry.rs
// =============================================================================
// Files found while crawling.
//
// The crawl engine appends a `CollectedFile` for every non-HTML resource
// with a usable name. The download pipeline later fills in the final name
// and the staging path; entries are never removed from the list.
// =============================================================================

use std::path::PathBuf;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    pub source_url: Url,
    /// Last segment of the URL path, as found
    pub logical_name: String,
    /// `logical_name`, possibly with an extension appended
    pub resolved_name: String,
    /// Set once the bytes are in the staging directory
    pub local_path: Option<PathBuf>,
}

impl CollectedFile {
    pub fn new(source_url: Url, logical_name: String) -> Self {
        Self {
            source_url,
            resolved_name: logical_name.clone(),
            logical_name,
            local_path: None,
        }
    }
}
