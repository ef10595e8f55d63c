// src/error.rs
// =============================================================================
// Error types for the sitemap walker.
//
// Every way a walk can stop is a variant of `Error`. Callers that only care
// about the broad category (network trouble, bad XML, limit reached, their
// own callback failing) can ask for `Error::kind()` instead of matching on
// every variant.
//
// Rust concepts:
// - thiserror: Derives Display and std::error::Error from attributes
// - #[source]: Keeps the underlying error reachable through .source()
// =============================================================================

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Result type alias for walker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request failed, timed out, was cancelled or returned a bad status
    Transport,
    /// The payload could not be decompressed or parsed
    Decode,
    /// The configured `max_urls` ceiling was reached
    LimitReached,
    /// The item callback returned an error
    ConsumerAbort,
    /// Bad input before any request was made
    Setup,
}

/// Main error type for the walker
#[derive(Debug, Error)]
pub enum Error {
    /// The starting URL could not be used
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request itself failed (DNS, connection, TLS, body read...)
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// The request took longer than the per-request timeout
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: Url, timeout: Duration },

    /// The caller's cancellation token fired
    #[error("walk cancelled")]
    Cancelled,

    /// A sitemap answered with something other than 200 OK
    #[error("unexpected HTTP {status} for sitemap {url}")]
    Status { url: Url, status: StatusCode },

    /// The payload looked compressed but could not be inflated
    #[error("failed to decompress {url}: {source}")]
    Decompress {
        url: Url,
        #[source]
        source: std::io::Error,
    },

    /// The XML reader rejected the document
    #[error("malformed XML in {url}: {source}")]
    Xml {
        url: Url,
        #[source]
        source: quick_xml::Error,
    },

    /// The XML was well-formed tokens but not a usable document
    #[error("malformed sitemap {url}: {reason}")]
    MalformedDocument { url: Url, reason: String },

    /// The root element is neither <urlset> nor <sitemapindex>
    #[error("unsupported sitemap root <{root}> in {url}")]
    UnsupportedDocument { url: Url, root: String },

    /// `max_urls` items have been delivered
    #[error("reached the maximum of {limit} URLs")]
    MaxUrls { limit: usize },

    /// The item callback asked the walk to stop
    #[error("walk aborted by item callback: {0}")]
    Consumer(#[source] anyhow::Error),
}

impl Error {
    /// Returns the broad category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl { .. } | Error::Client(_) => ErrorKind::Setup,
            Error::Fetch { .. }
            | Error::Timeout { .. }
            | Error::Cancelled
            | Error::Status { .. } => ErrorKind::Transport,
            Error::Decompress { .. }
            | Error::Xml { .. }
            | Error::MalformedDocument { .. }
            | Error::UnsupportedDocument { .. } => ErrorKind::Decode,
            Error::MaxUrls { .. } => ErrorKind::LimitReached,
            Error::Consumer(_) => ErrorKind::ConsumerAbort,
        }
    }

    /// True when the walk stopped because enough URLs were delivered
    pub fn is_max_urls(&self) -> bool {
        matches!(self, Error::MaxUrls { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::MaxUrls { limit: 3 }.kind(), ErrorKind::LimitReached);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Transport);
        assert_eq!(
            Error::Consumer(anyhow::anyhow!("stop")).kind(),
            ErrorKind::ConsumerAbort
        );

        let url = Url::parse("https://example.com/sitemap.xml").unwrap();
        let err = Error::UnsupportedDocument {
            url,
            root: "html".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!err.is_max_urls());
    }

    #[test]
    fn test_display_mentions_url_and_status() {
        let url = Url::parse("https://example.com/bad.xml").unwrap();
        let err = Error::Status {
            url,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        let text = err.to_string();
        assert!(text.contains("https://example.com/bad.xml"));
        assert!(text.contains("500"));
    }
}
