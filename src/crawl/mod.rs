// src/crawl/mod.rs
// =============================================================================
// This module drives the crawl.
//
// Features:
// - Walks labels, blocks, addresses and sites in a fixed order
// - Streams every found edit straight to the output
// - Keeps going when a single request fails
// - Optional pause between queries, to be polite to the wiki
// =============================================================================

mod driver;

pub use driver::{CrawlStats, Crawler};
