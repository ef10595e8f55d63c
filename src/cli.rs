// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use sitemap_walker::Options;
use std::time::Duration;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "sitemap-walker",
    version,
    about = "Print every URL listed in a website's sitemaps",
    long_about = "sitemap-walker reads a sitemap, a sitemap index, or discovers the sitemaps of a \
                  site root, and prints every page URL it finds as soon as it is found."
)]
pub struct Cli {
    /// Sitemap URL or site root (e.g., https://example.com/)
    ///
    /// A bare site root triggers discovery through robots.txt and /sitemap.xml
    pub url: String,

    /// Fetch sitemaps even when robots.txt disallows them
    #[arg(long)]
    pub ignore_robots: bool,

    /// Only print URLs matching this regex (repeatable; any match is enough)
    #[arg(long, value_name = "REGEX")]
    pub include: Vec<String>,

    /// Never print URLs matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Stop after this many URLs (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub max_urls: usize,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Warn and continue when a sitemap returns a non-200 status
    #[arg(long)]
    pub skip_non_200: bool,

    /// Maximum nesting of sitemap indexes
    #[arg(long, default_value_t = sitemap_walker::options::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// User-Agent header, also used to select robots.txt rules
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Print one JSON object per URL instead of plain URLs
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Turns the parsed flags into walker options
    ///
    /// Fails if one of the regexes does not compile.
    pub fn options(&self) -> Result<Options> {
        let mut options = Options {
            ignore_robots: self.ignore_robots,
            include: compile_patterns(&self.include)?,
            exclude: compile_patterns(&self.exclude)?,
            max_urls: self.max_urls,
            per_request_timeout: Duration::from_secs(self.timeout),
            skip_non_200: self.skip_non_200,
            max_depth: self.max_depth,
            ..Options::default()
        };
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = user_agent.clone();
        }
        Ok(options)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("invalid pattern '{}'", p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from([
            "sitemap-walker",
            "https://example.com/",
            "--include",
            "/blog/",
            "--include",
            "/docs/",
            "--exclude",
            "draft",
            "--max-urls",
            "10",
            "--timeout",
            "5",
            "--skip-non-200",
            "--user-agent",
            "my-bot/2.0",
        ]);

        let options = cli.options().unwrap();
        assert_eq!(options.include.len(), 2);
        assert_eq!(options.exclude.len(), 1);
        assert_eq!(options.max_urls, 10);
        assert_eq!(options.per_request_timeout, Duration::from_secs(5));
        assert!(options.skip_non_200);
        assert!(!options.ignore_robots);
        assert_eq!(options.user_agent, "my-bot/2.0");
    }

    #[test]
    fn test_bad_regex_is_reported() {
        let cli = Cli::parse_from(["sitemap-walker", "https://example.com/", "--include", "("]);
        let err = cli.options().unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
    }
}
