// src/options.rs
// =============================================================================
// Configuration for a SitemapFetcher.
//
// Options is built once and can be reused for any number of walks. Nothing
// in here changes while a walk is running; per-walk state lives in the
// walker itself.
// =============================================================================

use crate::walk::DiagnosticSink;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default time budget for a single HTTP request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit on how deep sitemap indexes may nest
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// User-Agent sent with every request and used to pick robots.txt groups
pub const DEFAULT_USER_AGENT: &str = concat!("sitemap-walker/", env!("CARGO_PKG_VERSION"));

/// Settings for a SitemapFetcher
#[derive(Clone)]
pub struct Options {
    /// Skip robots.txt entirely
    pub ignore_robots: bool,
    /// Keep a URL only if at least one of these matches (empty = keep all)
    pub include: Vec<Regex>,
    /// Drop a URL if any of these matches
    pub exclude: Vec<Regex>,
    /// Stop after this many URLs (0 = no limit)
    pub max_urls: usize,
    /// Deadline for each individual request
    pub per_request_timeout: Duration,
    /// Warn and move on when a sitemap answers with anything but 200
    pub skip_non_200: bool,
    /// Where warnings go; defaults to `tracing`
    pub diagnostics: Option<Arc<dyn DiagnosticSink>>,
    /// Use this HTTP client instead of building one
    pub client: Option<reqwest::Client>,
    pub user_agent: String,
    /// Sitemap indexes nested deeper than this are skipped
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ignore_robots: false,
            include: Vec::new(),
            exclude: Vec::new(),
            max_urls: 0,
            per_request_timeout: DEFAULT_TIMEOUT,
            skip_non_200: false,
            diagnostics: None,
            client: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// Manual Debug because the diagnostic sink is a trait object
impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("ignore_robots", &self.ignore_robots)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("max_urls", &self.max_urls)
            .field("per_request_timeout", &self.per_request_timeout)
            .field("skip_non_200", &self.skip_non_200)
            .field("diagnostics", &self.diagnostics.is_some())
            .field("client", &self.client.is_some())
            .field("user_agent", &self.user_agent)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Include/exclude patterns applied to every discovered URL
#[derive(Debug, Clone, Default)]
pub struct Filters {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl Filters {
    pub fn new(include: Vec<Regex>, exclude: Vec<Regex>) -> Self {
        Self { include, exclude }
    }

    /// Decides whether a URL should be handed to the caller
    ///
    /// Exclusion is checked first, so a URL matching both lists is dropped.
    pub fn accepts(&self, url: &str) -> bool {
        if self.exclude.iter().any(|re| re.is_match(url)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    #[test]
    fn test_no_patterns_accepts_everything() {
        let filters = Filters::default();
        assert!(filters.accepts("https://example.com/anything"));
    }

    #[test]
    fn test_exclude_beats_include() {
        let filters = Filters::new(vec![re("blog")], vec![re("draft")]);
        assert!(filters.accepts("https://example.com/blog/post"));
        assert!(!filters.accepts("https://example.com/blog/draft-post"));
        assert!(!filters.accepts("https://example.com/about"));
    }

    #[test]
    fn test_any_include_is_enough() {
        let filters = Filters::new(vec![re("/docs/"), re("/blog/")], Vec::new());
        assert!(filters.accepts("https://example.com/docs/intro"));
        assert!(filters.accepts("https://example.com/blog/hello"));
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.max_urls, 0);
        assert_eq!(options.per_request_timeout, DEFAULT_TIMEOUT);
        assert!(options.user_agent.starts_with("sitemap-walker/"));
    }
}
