// src/robots/gate.rs
// =============================================================================
// The permission gate: robots.txt lookups with a per-walk cache.
//
// How it works:
// 1. The first time a walk touches an origin (scheme + host + port), fetch
//    <origin>/robots.txt
// 2. Parse it for our user agent and remember the result for that origin
// 3. Every later sitemap on the same origin reuses the cached rules
//
// A missing robots.txt, a non-200 answer or a network failure all mean
// "no restrictions". Only cancellation stops the walk.
//
// The gate belongs to a single walk and is dropped with it, so separate
// walks never share verdicts.
// =============================================================================

use super::rules::{parse_robots, RobotsRules};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use std::collections::HashMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Per-walk robots.txt cache
pub struct PermissionGate<'a> {
    fetcher: &'a Fetcher,
    timeout: Duration,
    user_agent: &'a str,
    // origin -> parsed rules
    cache: HashMap<String, RobotsRules>,
}

impl<'a> PermissionGate<'a> {
    pub fn new(fetcher: &'a Fetcher, timeout: Duration, user_agent: &'a str) -> Self {
        Self {
            fetcher,
            timeout,
            user_agent,
            cache: HashMap::new(),
        }
    }

    /// Returns the robots.txt rules for the origin of `url`
    ///
    /// robots.txt is fetched at most once per origin.
    pub async fn rules_for(&mut self, url: &Url, cancel: &CancellationToken) -> Result<&RobotsRules> {
        let origin = url.origin().ascii_serialization();

        if !self.cache.contains_key(&origin) {
            let rules = self.fetch_rules(url, cancel).await?;
            self.cache.insert(origin.clone(), rules);
        }

        Ok(self.cache.entry(origin).or_default())
    }

    /// Asks whether `url` may be fetched
    pub async fn allowed(&mut self, url: &Url, cancel: &CancellationToken) -> Result<bool> {
        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let rules = self.rules_for(url, cancel).await?;
        let allowed = rules.is_allowed(&target);
        if !allowed {
            debug!(url = %url, "disallowed by robots.txt");
        }
        Ok(allowed)
    }

    async fn fetch_rules(&self, url: &Url, cancel: &CancellationToken) -> Result<RobotsRules> {
        let robots_url = match url.join("/robots.txt") {
            Ok(robots_url) => robots_url,
            Err(_) => return Ok(RobotsRules::allow_all()),
        };

        match self.fetcher.fetch(&robots_url, self.timeout, cancel).await {
            Ok(response) if response.status.is_success() => {
                let body = String::from_utf8_lossy(&response.body);
                debug!(url = %robots_url, "loaded robots.txt");
                Ok(parse_robots(&body, self.user_agent))
            }
            Ok(response) => {
                debug!(url = %robots_url, status = response.status.as_u16(), "no robots.txt, allowing all");
                Ok(RobotsRules::allow_all())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                debug!(url = %robots_url, error = %e, "robots.txt unavailable, allowing all");
                Ok(RobotsRules::allow_all())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::build_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_robots_fetched_once_per_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(build_client("test-agent").unwrap());
        let mut gate = PermissionGate::new(&fetcher, Duration::from_secs(5), "test-agent");
        let cancel = CancellationToken::new();

        let open = Url::parse(&format!("{}/sitemap.xml", server.uri())).unwrap();
        let closed = Url::parse(&format!("{}/private/sitemap.xml", server.uri())).unwrap();

        assert!(gate.allowed(&open, &cancel).await.unwrap());
        assert!(!gate.allowed(&closed, &cancel).await.unwrap());
        assert!(gate.allowed(&open, &cancel).await.unwrap());
        // MockServer verifies the single robots.txt request on drop
    }

    #[tokio::test]
    async fn test_missing_robots_allows_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(build_client("test-agent").unwrap());
        let mut gate = PermissionGate::new(&fetcher, Duration::from_secs(5), "test-agent");

        let url = Url::parse(&format!("{}/sitemap.xml", server.uri())).unwrap();
        assert!(gate.allowed(&url, &CancellationToken::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_host_allows_everything() {
        let fetcher = Fetcher::new(build_client("test-agent").unwrap());
        let mut gate = PermissionGate::new(&fetcher, Duration::from_secs(2), "test-agent");

        // Port 9 (discard) is closed on loopback, so the connection is refused
        let url = Url::parse("http://127.0.0.1:9/sitemap.xml").unwrap();
        assert!(gate.allowed(&url, &CancellationToken::new()).await.unwrap());
    }
}
