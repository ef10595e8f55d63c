// src/decode/mod.rs
// =============================================================================
// This module turns fetched bytes into a sitemap document.
//
// Submodules:
// - gzip: Detects and inflates compressed payloads
// - xml: Reads <urlset> and <sitemapindex> documents
//
// The result is a `Document`, which is either a list of page entries (a leaf
// sitemap) or a list of child sitemap references (an index). The walker
// branches on that tag instead of poking at raw XML.
// =============================================================================

mod gzip;
mod xml;

pub use gzip::{has_gzip_magic, inflate, is_gzip_path};
pub use xml::{parse_document, Document, SitemapRef, UrlEntry};

use crate::error::{Error, Result};
use std::borrow::Cow;
use tracing::debug;
use url::Url;

// Decodes a fetched sitemap body
//
// Steps:
// 1. Inflate the body if the URL ends in .gz or the bytes carry the gzip
//    magic number (servers often mislabel compressed sitemaps)
// 2. Parse the XML into a Document
pub fn decode(url: &Url, body: &[u8]) -> Result<Document> {
    let payload: Cow<'_, [u8]> = if is_gzip_path(url) || has_gzip_magic(body) {
        debug!(url = %url, compressed = body.len(), "inflating gzip sitemap");
        let inflated = inflate(body).map_err(|source| Error::Decompress {
            url: url.clone(),
            source,
        })?;
        Cow::Owned(inflated)
    } else {
        Cow::Borrowed(body)
    };

    parse_document(url, &payload)
}
