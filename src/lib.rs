// src/lib.rs
// =============================================================================
// sitemap-walker: streams every URL listed in a website's sitemaps.
//
// Give it a sitemap, a sitemap index, or just a site root. It follows index
// files down to the leaf sitemaps, inflates .gz files, asks robots.txt for
// permission, filters URLs with regexes, and hands each URL to your callback
// as soon as it is found.
//
// Example:
//
//   let fetcher = SitemapFetcher::new(Options::default())?;
//   let start = Url::parse("https://example.com/")?;
//   fetcher
//       .walk(&CancellationToken::new(), &start, |item| {
//           println!("{}", item.loc);
//           Ok(())
//       })
//       .await?;
// =============================================================================

pub mod decode;
pub mod error;
pub mod fetch;
pub mod item;
pub mod options;
pub mod robots;
pub mod walk;

pub use error::{Error, ErrorKind, Result};
pub use item::Item;
pub use options::{Filters, Options};
pub use walk::{Diagnostic, DiagnosticSink, SitemapFetcher, TracingSink};

// Re-exported so callers do not need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
