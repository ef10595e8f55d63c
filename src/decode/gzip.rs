// src/decode/gzip.rs
// =============================================================================
// Gzip detection and decompression.
//
// Sitemaps are often published as sitemap.xml.gz. Servers are not reliable
// about Content-Type or Content-Encoding for these files, so we look at the
// URL and at the first two bytes instead of at the headers.
// =============================================================================

use flate2::read::MultiGzDecoder;
use std::io::{self, Read};
use url::Url;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// True when the URL path names a gzip file
pub fn is_gzip_path(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".gz")
}

/// True when the payload starts with the gzip magic number
pub fn has_gzip_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Inflates a gzip payload
///
/// Concatenated gzip members are read as one stream.
pub fn inflate(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len().saturating_mul(4));
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
