// src/robots/mod.rs
// =============================================================================
// This module decides whether we are allowed to fetch a sitemap.
//
// Submodules:
// - rules: Parses robots.txt and answers "may this path be fetched?"
// - gate: Fetches robots.txt once per origin during a walk and caches it
//
// Why check robots.txt for sitemaps?
// - Sites sometimes block automated access to parts of their sitemap tree
// - A polite walker asks before fetching, just like a polite crawler
// =============================================================================

mod gate;
mod rules;

pub use gate::PermissionGate;
pub use rules::{parse_robots, RobotsRules};
