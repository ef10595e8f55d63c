// src/walk/diagnostics.rs
// =============================================================================
// Warnings raised during a walk that do not stop it.
//
// The walker reports these through a DiagnosticSink. The default sink logs
// them with `tracing`; callers can plug in their own (a test that counts
// warnings, a UI that shows them, ...).
//
// Rust concepts:
// - Trait objects: Arc<dyn DiagnosticSink> lets any type act as the sink
// - Blanket impls: Any matching closure is a sink too
// =============================================================================

use reqwest::StatusCode;
use std::fmt;
use tracing::warn;
use url::Url;

/// Something the walker skipped
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A sitemap answered with a non-200 status and `skip_non_200` is on
    SkippedStatus { sitemap: Url, status: StatusCode },
    /// A sitemap was referenced again after it had already been walked
    AlreadyVisited { sitemap: Url },
    /// Sitemap indexes nested deeper than `max_depth`
    DepthExceeded { sitemap: Url, depth: usize },
    /// A <loc> that could not be turned into an absolute URL
    InvalidLocation { base: Url, loc: String },
}

impl Diagnostic {
    /// Short, stable description of what happened
    pub fn message(&self) -> &'static str {
        match self {
            Diagnostic::SkippedStatus { .. } => "skipping sitemap due to non-200 response",
            Diagnostic::AlreadyVisited { .. } => "skipping sitemap that was already visited",
            Diagnostic::DepthExceeded { .. } => "skipping sitemap nested too deeply",
            Diagnostic::InvalidLocation { .. } => "skipping unresolvable location",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SkippedStatus { sitemap, status } => {
                write!(f, "{}: {} (HTTP {})", self.message(), sitemap, status.as_u16())
            }
            Diagnostic::AlreadyVisited { sitemap } => write!(f, "{}: {}", self.message(), sitemap),
            Diagnostic::DepthExceeded { sitemap, depth } => {
                write!(f, "{}: {} (depth {})", self.message(), sitemap, depth)
            }
            Diagnostic::InvalidLocation { base, loc } => {
                write!(f, "{}: {:?} in {}", self.message(), loc, base)
            }
        }
    }
}

/// Receives warnings from a walk
///
/// Called from the task running the walk, one diagnostic at a time.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn warn(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Default sink: structured `tracing` warnings
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, diagnostic: &Diagnostic) {
        let message = diagnostic.message();
        match diagnostic {
            Diagnostic::SkippedStatus { sitemap, status } => {
                warn!(sitemap = %sitemap, status = status.as_u16(), "{message}")
            }
            Diagnostic::AlreadyVisited { sitemap } => warn!(sitemap = %sitemap, "{message}"),
            Diagnostic::DepthExceeded { sitemap, depth } => {
                warn!(sitemap = %sitemap, depth, "{message}")
            }
            Diagnostic::InvalidLocation { base, loc } => {
                warn!(sitemap = %base, loc = %loc, "{message}")
            }
        }
    }
}
