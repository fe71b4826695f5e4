// src/fetch/mod.rs
// =============================================================================
// Talking to the website: fetching resources and pulling links out of pages.
//
// Submodules:
// - http: the reqwest-backed fetcher, with the politeness delay built in
// - html: link extraction from HTML pages via scraper
// =============================================================================

mod html;
mod http;

pub use html::extract_links;
pub use http::{FetchedResource, HttpFetcher};
