//! Feed classifier: decides whether fetched content is a syndication feed.
//!
//! This is deliberately not a feed *parser* — no entries are extracted. The
//! classifier event-scans the document with `quick-xml` and answers two
//! questions: is this XML rather than an HTML page, and does it carry a known
//! feed vocabulary (Atom `feed`, RSS `rss`, RDF `rdf` with channel/item)?

use quick_xml::events::Event;
use quick_xml::Reader;

/// The flavor of a verified feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// Atom 1.0 (`<feed>` root)
    Atom,
    /// RSS 0.9x/2.0 (`<rss>` root)
    Rss,
    /// RSS 1.0 / RDF Site Summary (`<rdf:RDF>` root with channel or item)
    Rdf,
    /// XML document with a feed vocabulary element below a foreign root
    GenericXml,
}

impl FeedKind {
    /// Short lowercase label, used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Atom => "atom",
            FeedKind::Rss => "rss",
            FeedKind::Rdf => "rdf",
            FeedKind::GenericXml => "xml",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies body text as a feed flavor, or `None` for anything else.
///
/// Any `html`/`head` element disqualifies the document immediately — feed
/// XML never contains them, and anchor-heuristic candidates are routinely
/// ordinary web pages. Parse errors end the scan; whatever vocabulary was
/// identified before the error stands (real-world feeds are frequently
/// truncated or carry trailing garbage).
pub fn classify(body: &str) -> Option<FeedKind> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().check_end_names = false;

    let mut root_seen = false;
    let mut kind: Option<FeedKind> = None;
    let mut rdf_has_channel = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name =
                    String::from_utf8_lossy(e.local_name().as_ref()).to_ascii_lowercase();
                match name.as_str() {
                    "html" | "head" => return None,
                    _ => {}
                }
                if !root_seen {
                    root_seen = true;
                    kind = match name.as_str() {
                        "feed" => Some(FeedKind::Atom),
                        "rss" => Some(FeedKind::Rss),
                        "rdf" => Some(FeedKind::Rdf),
                        _ => None,
                    };
                } else {
                    match name.as_str() {
                        "channel" | "item" => rdf_has_channel = true,
                        "feed" | "rss" | "rdf" if kind.is_none() => {
                            kind = Some(FeedKind::GenericXml)
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }

    match kind {
        // A bare rdf root is any RDF document; only channel/item make it a feed
        Some(FeedKind::Rdf) if !rdf_has_channel => None,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATOM: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example</title>
  <entry><id>1</id><title>Post</title></entry>
</feed>"#;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Example</title></channel></rss>"#;

    const RDF: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://example.com/"><title>Example</title></channel>
  <item rdf:about="https://example.com/1"><title>Post</title></item>
</rdf:RDF>"#;

    #[test]
    fn test_classify_atom() {
        assert_eq!(classify(ATOM), Some(FeedKind::Atom));
    }

    #[test]
    fn test_classify_rss() {
        assert_eq!(classify(RSS), Some(FeedKind::Rss));
    }

    #[test]
    fn test_classify_empty_rss_channel() {
        let body = r#"<?xml version="1.0"?> <rss version="2.0"></rss>"#;
        assert_eq!(classify(body), Some(FeedKind::Rss));
    }

    #[test]
    fn test_classify_rdf_with_channel() {
        assert_eq!(classify(RDF), Some(FeedKind::Rdf));
    }

    #[test]
    fn test_classify_bare_rdf_is_not_a_feed() {
        let body = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
            <rdf:Description rdf:about="x"/></rdf:RDF>"#;
        assert_eq!(classify(body), None);
    }

    #[test]
    fn test_classify_nested_feed_vocabulary_is_generic_xml() {
        let body = r#"<wrapper><rss version="2.0"><channel/></rss></wrapper>"#;
        assert_eq!(classify(body), Some(FeedKind::GenericXml));
    }

    #[test]
    fn test_classify_html_page() {
        let body = "<html><head><title>Blog</title></head><body>hi</body></html>";
        assert_eq!(classify(body), None);
    }

    #[test]
    fn test_classify_uppercase_html() {
        assert_eq!(classify("<HTML><BODY>hi</BODY></HTML>"), None);
    }

    #[test]
    fn test_classify_head_fragment() {
        // Some pages omit <html> but still carry <head>
        assert_eq!(classify("<head><title>x</title></head>"), None);
    }

    #[test]
    fn test_classify_plain_text() {
        assert_eq!(classify("just some words, no markup"), None);
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_classify_foreign_xml() {
        let body = r#"<?xml version="1.0"?><sitemap><url>https://example.com</url></sitemap>"#;
        assert_eq!(classify(body), None);
    }

    #[test]
    fn test_classify_truncated_feed_still_counts() {
        // Root identified before the document falls apart
        let body = r#"<rss version="2.0"><channel><title>Examp"#;
        assert_eq!(classify(body), Some(FeedKind::Rss));
    }
}
