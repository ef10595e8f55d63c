// src/walk/walker.rs
// =============================================================================
// This module implements the sitemap walk.
//
// How it works:
// 1. If the start URL is a bare origin (https://example.com/), discover the
//    sitemaps: robots.txt `Sitemap:` lines, or /sitemap.xml when there are none
// 2. For each sitemap: check robots.txt, fetch, decode
// 3. A <urlset> streams its entries to the caller one by one
// 4. A <sitemapindex> recurses into each child, depth-first, in order
//
// Stopping:
// - Any error unwinds the whole walk immediately
// - A non-200 sitemap is skipped instead when `skip_non_200` is on
// - Reaching `max_urls` stops the walk with Error::MaxUrls, AFTER the last
//   item has been delivered
//
// Each call to walk() gets fresh state (counter, robots cache, visited set),
// so one SitemapFetcher can run many walks, even concurrently.
//
// Rust concepts:
// - BoxFuture: an async fn cannot call itself directly because its future
//   would have infinite size, so the recursive step returns a boxed future
// - &mut dyn FnMut: the callback is borrowed for the whole walk
// =============================================================================

use super::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::decode::{decode, Document, UrlEntry};
use crate::error::{Error, Result};
use crate::fetch::{build_client, Fetcher};
use crate::item::{parse_lastmod, parse_priority, Item};
use crate::options::{Filters, Options};
use crate::robots::PermissionGate;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

// Probed when a bare origin is given and robots.txt lists no sitemaps
const DEFAULT_SITEMAP_PATH: &str = "/sitemap.xml";

type ItemCallback<'a> = dyn FnMut(Item) -> anyhow::Result<()> + Send + 'a;

/// Walks sitemap trees and streams the URLs they list
pub struct SitemapFetcher {
    options: Options,
    fetcher: Fetcher,
    filters: Filters,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl SitemapFetcher {
    /// Builds a fetcher from options
    ///
    /// Fails only if the default HTTP client cannot be built.
    pub fn new(options: Options) -> Result<Self> {
        let client = match &options.client {
            Some(client) => client.clone(),
            None => build_client(&options.user_agent)?,
        };
        let filters = Filters::new(options.include.clone(), options.exclude.clone());
        let diagnostics = options
            .diagnostics
            .clone()
            .unwrap_or_else(|| Arc::new(TracingSink));

        Ok(Self {
            options,
            fetcher: Fetcher::new(client),
            filters,
            diagnostics,
        })
    }

    /// Walks everything reachable from `start`, calling `on_item` for each URL
    ///
    /// `on_item` runs synchronously and in document order. Returning an error
    /// from it stops the walk with `Error::Consumer`. Items delivered before
    /// any failure stay delivered.
    pub async fn walk<F>(&self, cancel: &CancellationToken, start: &Url, mut on_item: F) -> Result<()>
    where
        F: FnMut(Item) -> anyhow::Result<()> + Send,
    {
        if !is_http(start) {
            return Err(Error::InvalidUrl {
                url: start.to_string(),
                reason: "only http and https URLs can be walked".to_string(),
            });
        }

        let mut walk = Walk {
            owner: self,
            cancel,
            gate: (!self.options.ignore_robots).then(|| {
                PermissionGate::new(
                    &self.fetcher,
                    self.options.per_request_timeout,
                    &self.options.user_agent,
                )
            }),
            emitted: 0,
            visited: HashSet::new(),
            on_item: &mut on_item,
        };

        let roots = if is_bare_origin(start) {
            walk.discover(start).await?
        } else {
            vec![start.clone()]
        };

        for root in roots {
            walk.visit(root, 0, false).await?;
        }

        debug!(start = %start, emitted = walk.emitted, "walk finished");
        Ok(())
    }
}

// True when the URL names a site rather than a specific sitemap file
fn is_bare_origin(url: &Url) -> bool {
    matches!(url.path(), "" | "/") && url.query().is_none()
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

// Resolves a <loc> against the document it appeared in
fn resolve(base: &Url, loc: &str) -> Option<Url> {
    base.join(loc.trim()).ok()
}

// State for one walk
struct Walk<'a> {
    owner: &'a SitemapFetcher,
    cancel: &'a CancellationToken,
    // None when robots.txt is ignored
    gate: Option<PermissionGate<'a>>,
    emitted: usize,
    visited: HashSet<Url>,
    on_item: &'a mut ItemCallback<'a>,
}

impl<'a> Walk<'a> {
    // Finds the sitemaps of a bare origin
    async fn discover(&mut self, origin: &Url) -> Result<Vec<Url>> {
        let mut found = Vec::new();

        if let Some(gate) = self.gate.as_mut() {
            let declared = gate.rules_for(origin, self.cancel).await?.sitemaps.clone();
            for loc in declared {
                match resolve(origin, &loc) {
                    Some(url) if is_http(&url) => found.push(url),
                    _ => self.warn(Diagnostic::InvalidLocation {
                        base: origin.clone(),
                        loc,
                    }),
                }
            }
        }

        if found.is_empty() {
            let fallback = origin.join(DEFAULT_SITEMAP_PATH).map_err(|e| Error::InvalidUrl {
                url: origin.to_string(),
                reason: e.to_string(),
            })?;
            found.push(fallback);
        }

        debug!(origin = %origin, sitemaps = found.len(), "discovered sitemaps");
        Ok(found)
    }

    // Visits one sitemap
    //
    // `nested` is true when the sitemap was reached through an index; its
    // items then record which sitemap they came from.
    fn visit(&mut self, sitemap: Url, depth: usize, nested: bool) -> BoxFuture<'_, Result<()>> {
        async move {
            let owner = self.owner;
            let options = &owner.options;

            if depth > options.max_depth {
                self.warn(Diagnostic::DepthExceeded { sitemap, depth });
                return Ok(());
            }
            if !self.visited.insert(sitemap.clone()) {
                self.warn(Diagnostic::AlreadyVisited { sitemap });
                return Ok(());
            }

            if let Some(gate) = self.gate.as_mut() {
                if !gate.allowed(&sitemap, self.cancel).await? {
                    return Ok(());
                }
            }

            let response = owner
                .fetcher
                .fetch(&sitemap, options.per_request_timeout, self.cancel)
                .await?;

            if !response.is_ok() {
                if options.skip_non_200 {
                    self.warn(Diagnostic::SkippedStatus {
                        sitemap,
                        status: response.status,
                    });
                    return Ok(());
                }
                return Err(Error::Status {
                    url: sitemap,
                    status: response.status,
                });
            }

            match decode(&sitemap, &response.body)? {
                Document::UrlSet(entries) => {
                    debug!(sitemap = %sitemap, entries = entries.len(), "urlset");
                    let source = nested.then(|| sitemap.clone());
                    self.emit_all(&sitemap, source, entries)
                }
                Document::Index(children) => {
                    debug!(sitemap = %sitemap, children = children.len(), "sitemap index");
                    for child in children {
                        match resolve(&sitemap, &child.loc) {
                            Some(url) if is_http(&url) => {
                                self.visit(url, depth + 1, true).await?;
                            }
                            _ => self.warn(Diagnostic::InvalidLocation {
                                base: sitemap.clone(),
                                loc: child.loc,
                            }),
                        }
                    }
                    Ok(())
                }
            }
        }
        .boxed()
    }

    // Filters and delivers the entries of one <urlset>
    fn emit_all(&mut self, base: &Url, source: Option<Url>, entries: Vec<UrlEntry>) -> Result<()> {
        let owner = self.owner;
        let options = &owner.options;

        for entry in entries {
            let Some(loc) = resolve(base, &entry.loc) else {
                self.warn(Diagnostic::InvalidLocation {
                    base: base.clone(),
                    loc: entry.loc,
                });
                continue;
            };

            if !owner.filters.accepts(loc.as_str()) {
                continue;
            }

            let item = Item {
                loc,
                last_modified: entry.lastmod.as_deref().and_then(parse_lastmod),
                change_frequency: entry.changefreq,
                priority: entry.priority.as_deref().and_then(parse_priority),
                sitemap: source.clone(),
            };

            self.emitted += 1;
            (self.on_item)(item).map_err(Error::Consumer)?;

            if options.max_urls > 0 && self.emitted >= options.max_urls {
                return Err(Error::MaxUrls {
                    limit: options.max_urls,
                });
            }
        }

        Ok(())
    }

    fn warn(&self, diagnostic: Diagnostic) {
        self.owner.diagnostics.warn(&diagnostic);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not just `async fn visit`?
//    - An async fn compiles to a state machine that contains every future it
//      awaits. If it awaits itself, the type would contain itself forever.
//    - Boxing the future (`.boxed()`) puts the inner state machine on the heap,
//      so the outer one only stores a pointer.
//
// 2. Why is the callback `FnMut` and not `Fn`?
//    - Callers usually push into a Vec or bump a counter, which mutates state
//    - FnMut allows that; the walk never calls it from two places at once
//
// 3. What does `(!flag).then(|| ...)` do?
//    - bool::then returns Some(value) when the bool is true, None otherwise
//    - Here it builds the robots.txt gate only when robots are respected
// -----------------------------------------------------------------------------
