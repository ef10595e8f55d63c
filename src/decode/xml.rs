// src/decode/xml.rs
// =============================================================================
// This module reads sitemap XML.
//
// Two document shapes exist (https://www.sitemaps.org/protocol.html):
//
//   <urlset>                        <sitemapindex>
//     <url>                           <sitemap>
//       <loc>/page</loc>                <loc>/nested.xml</loc>
//       <lastmod>...</lastmod>          <lastmod>...</lastmod>
//       <changefreq>...</changefreq>  </sitemap>
//       <priority>...</priority>    </sitemapindex>
//     </url>
//   </urlset>
//
// The root element decides the shape. Any other root is rejected. Index
// entries keep only their <loc>.
//
// We use quick-xml's event reader. Element names are compared by local name,
// so prefixed documents (<sm:urlset>) work too. Extension elements such as
// <image:image> sit one level deeper than the fields we read and are ignored.
//
// Values are kept as raw trimmed strings here. Resolving <loc> against the
// sitemap URL and parsing dates happens in the walker, which knows the base.
// =============================================================================

use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

/// One <url> entry of a leaf sitemap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

/// One <sitemap> reference of a sitemap index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SitemapRef {
    pub loc: String,
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// <urlset>: leaf entries
    UrlSet(Vec<UrlEntry>),
    /// <sitemapindex>: references to other sitemaps
    Index(Vec<SitemapRef>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    UrlSet,
    Index,
}

impl Shape {
    fn from_root(name: &[u8]) -> Option<Self> {
        match name {
            b"urlset" => Some(Shape::UrlSet),
            b"sitemapindex" => Some(Shape::Index),
            _ => None,
        }
    }

    fn entry_tag(self) -> &'static [u8] {
        match self {
            Shape::UrlSet => b"url",
            Shape::Index => b"sitemap",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"loc" => Some(Field::Loc),
            b"lastmod" => Some(Field::Lastmod),
            b"changefreq" => Some(Field::Changefreq),
            b"priority" => Some(Field::Priority),
            _ => None,
        }
    }
}

// Collects the fields of the <url> or <sitemap> currently open
#[derive(Debug, Default)]
struct PendingEntry {
    loc: String,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
}

impl PendingEntry {
    fn set(&mut self, field: Field, value: String) {
        if value.is_empty() {
            return;
        }
        match field {
            Field::Loc => self.loc = value,
            Field::Lastmod => self.lastmod = Some(value),
            Field::Changefreq => self.changefreq = Some(value),
            Field::Priority => self.priority = Some(value),
        }
    }
}

// Accumulates entries as the reader walks the document
struct DocumentBuilder {
    shape: Shape,
    urls: Vec<UrlEntry>,
    sitemaps: Vec<SitemapRef>,
}

impl DocumentBuilder {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            urls: Vec::new(),
            sitemaps: Vec::new(),
        }
    }

    // Entries without a <loc> carry nothing we can use
    fn push(&mut self, entry: PendingEntry) {
        if entry.loc.is_empty() {
            return;
        }
        match self.shape {
            Shape::UrlSet => self.urls.push(UrlEntry {
                loc: entry.loc,
                lastmod: entry.lastmod,
                changefreq: entry.changefreq,
                priority: entry.priority,
            }),
            Shape::Index => self.sitemaps.push(SitemapRef { loc: entry.loc }),
        }
    }

    fn finish(self) -> Document {
        match self.shape {
            Shape::UrlSet => Document::UrlSet(self.urls),
            Shape::Index => Document::Index(self.sitemaps),
        }
    }
}

/// Parses decompressed sitemap XML
///
/// `url` is only used for error messages.
pub fn parse_document(url: &Url, xml: &[u8]) -> Result<Document> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let malformed = |reason: &str| Error::MalformedDocument {
        url: url.clone(),
        reason: reason.to_string(),
    };

    let mut buf = Vec::new();
    let mut builder: Option<DocumentBuilder> = None;
    let mut entry: Option<PendingEntry> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();
    // Number of currently open elements; the root is depth 1
    let mut depth = 0usize;

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(|source| Error::Xml {
            url: url.clone(),
            source,
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let self_closing = matches!(event, Event::Empty(_));
                let local = e.local_name();
                let name = local.as_ref();

                match depth {
                    0 => {
                        if builder.is_some() {
                            return Err(malformed("more than one root element"));
                        }
                        let shape = Shape::from_root(name).ok_or_else(|| {
                            Error::UnsupportedDocument {
                                url: url.clone(),
                                root: String::from_utf8_lossy(name).into_owned(),
                            }
                        })?;
                        builder = Some(DocumentBuilder::new(shape));
                    }
                    1 => {
                        let is_entry = builder
                            .as_ref()
                            .map_or(false, |b| name == b.shape.entry_tag());
                        if is_entry && !self_closing {
                            entry = Some(PendingEntry::default());
                        }
                    }
                    2 if entry.is_some() && !self_closing => {
                        field = Field::from_tag(name);
                        text.clear();
                    }
                    _ => {}
                }

                if !self_closing {
                    depth += 1;
                }
            }
            Event::Text(e) => {
                if field.is_some() {
                    let unescaped = e.unescape().map_err(|source| Error::Xml {
                        url: url.clone(),
                        source: source.into(),
                    })?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                match depth {
                    3 => {
                        if let (Some(f), Some(pending)) = (field.take(), entry.as_mut()) {
                            pending.set(f, text.trim().to_string());
                        }
                    }
                    2 => {
                        if let (Some(pending), Some(b)) = (entry.take(), builder.as_mut()) {
                            b.push(pending);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => {
                if depth != 0 {
                    return Err(malformed("unexpected end of document"));
                }
                break;
            }
            // Declarations, comments, processing instructions, doctypes
            _ => {}
        }
    }

    builder
        .map(DocumentBuilder::finish)
        .ok_or_else(|| malformed("no root element"))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why an event reader instead of a DOM?
//    - Sitemaps can hold 50,000 entries; we never need the whole tree at once
//    - quick-xml hands us Start/Text/End events and we keep only a little state
//
// 2. What is `ref e` in a match?
//    - It borrows the inside of the enum instead of moving it out, so the
//      event can still be inspected afterwards (see `matches!(event, ...)`)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/sitemap.xml").unwrap()
    }

    #[test]
    fn test_urlset_fields() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>/page-a</loc>
    <lastmod>2024-01-02</lastmod>
    <changefreq>daily</changefreq>
    <priority>0.7</priority>
  </url>
  <url>
    <loc>https://example.com/page-b</loc>
  </url>
</urlset>"#;

        let doc = parse_document(&base(), xml.as_bytes()).unwrap();
        let Document::UrlSet(entries) = doc else {
            panic!("expected a urlset");
        };

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, "/page-a");
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-01-02"));
        assert_eq!(entries[0].changefreq.as_deref(), Some("daily"));
        assert_eq!(entries[0].priority.as_deref(), Some("0.7"));
        assert_eq!(entries[1].lastmod, None);
    }

    #[test]
    fn test_sitemap_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>/one.xml</loc><lastmod>2024-05-01</lastmod></sitemap>
  <sitemap><loc>/two.xml.gz</loc></sitemap>
</sitemapindex>"#;

        let doc = parse_document(&base(), xml.as_bytes()).unwrap();
        assert_eq!(
            doc,
            Document::Index(vec![
                SitemapRef {
                    loc: "/one.xml".to_string(),
                },
                SitemapRef {
                    loc: "/two.xml.gz".to_string(),
                },
            ])
        );
    }

    #[test]
    fn test_entities_cdata_and_extensions() {
        let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://example.com/?a=1&amp;b=2</loc>
    <image:image><image:loc>https://example.com/pic.png</image:loc></image:image>
  </url>
  <url><loc><![CDATA[https://example.com/cdata]]></loc></url>
</urlset>"#;

        let Document::UrlSet(entries) = parse_document(&base(), xml.as_bytes()).unwrap() else {
            panic!("expected a urlset");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].loc, "https://example.com/?a=1&b=2");
        assert_eq!(entries[1].loc, "https://example.com/cdata");
    }

    #[test]
    fn test_empty_documents() {
        assert_eq!(
            parse_document(&base(), b"<urlset/>").unwrap(),
            Document::UrlSet(Vec::new())
        );
        assert_eq!(
            parse_document(&base(), b"<urlset><url></url><url><loc> </loc></url></urlset>").unwrap(),
            Document::UrlSet(Vec::new())
        );
    }

    #[test]
    fn test_unknown_root_is_rejected() {
        let err = parse_document(&base(), b"<html><body>nope</body></html>").unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedDocument { ref root, .. } if root == "html"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_broken_xml_is_rejected() {
        assert!(parse_document(&base(), b"<urlset><url><loc>/a</url></urlset>").is_err());
        assert!(parse_document(&base(), b"<urlset><url><loc>/a</loc>").is_err());
        assert!(parse_document(&base(), b"").is_err());
        assert!(parse_document(&base(), b"just text").is_err());
    }
}
