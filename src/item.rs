// src/item.rs
// =============================================================================
// This module defines the value handed to the caller for every URL found.
//
// An Item is built once from a <url> entry, passed to the callback, and then
// forgotten. The walker never keeps a list of items around.
//
// <lastmod> uses the W3C datetime profile, which allows anything from a bare
// year ("2024") up to a full timestamp with fractional seconds and a zone.
// =============================================================================

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::Serialize;
use url::Url;

/// One URL discovered in a sitemap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Absolute location of the page
    pub loc: Url,
    /// Parsed <lastmod>, if present and well-formed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<FixedOffset>>,
    /// <changefreq> as written in the document ("daily", "weekly", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_frequency: Option<String>,
    /// <priority>, nominally between 0.0 and 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    /// The nested sitemap this entry came from, when it was reached through a
    /// sitemap index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<Url>,
}

// Parses a <lastmod> value
//
// Accepted forms:
//   2024
//   2024-01
//   2024-01-02
//   2024-01-02T10:30+01:00
//   2024-01-02T10:30:15Z
//   2024-01-02T10:30:15.25-05:00
//
// Date-only values are read as midnight UTC.
// Returns None for anything else.
pub fn parse_lastmod(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if !raw.contains('T') {
        let date = match raw.len() {
            4 => NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1)?,
            7 => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()?,
            10 => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?,
            _ => return None,
        };
        let utc = FixedOffset::east_opt(0)?;
        return Some(utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    // chrono's %:z does not take "Z", so spell UTC out
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .or_else(|_| DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z"))
        .ok()
}

// Parses a <priority> value; junk is dropped rather than failing the walk
pub fn parse_priority(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}
