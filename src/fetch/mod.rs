// src/fetch/mod.rs
// =============================================================================
// This module downloads sitemap and robots.txt resources.
//
// Submodules:
// - http: One GET per resource with a per-request deadline and cancellation
//
// The fetcher only moves bytes. Deciding what a status code means is left to
// the walker and the permission gate.
// =============================================================================

mod http;

pub use http::{build_client, FetchResponse, Fetcher};
