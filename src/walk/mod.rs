// src/walk/mod.rs
// =============================================================================
// This module walks a sitemap tree and streams the URLs it finds.
//
// Submodules:
// - walker: The SitemapFetcher and its depth-first traversal
// - diagnostics: Warnings about sitemaps that were skipped
// =============================================================================

mod diagnostics;
mod walker;

pub use diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
pub use walker::SitemapFetcher;
