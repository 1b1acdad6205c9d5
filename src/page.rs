//! Page model: the immutable, extracted view of one fetched document.
//!
//! A [`Page`] is built once per fetched address and owns everything the
//! candidate generators need: the declared feed links and every anchor with
//! its resolved target and visible text, both in document order. The
//! `scraper` DOM is dropped before the constructor returns — it is not
//! `Send`, and a page lives inside a search cursor that crosses await
//! points.

use scraper::{Html, Selector};
use url::Url;

use crate::classify::{classify, FeedKind};
use crate::util;

/// MIME types that mark a `<link>`/`<a>` element as a declared feed.
const FEED_MIME_TYPES: &[&str] = &[
    "application/rss+xml",
    "application/atom+xml",
    "application/rdf+xml",
    "application/x.atom+xml",
    "application/x-atom+xml",
    "text/xml",
];

/// One `<a href>` element from the document.
#[derive(Debug, Clone)]
pub struct Anchor {
    /// The href attribute exactly as written (the keyword heuristics look
    /// at this, not the resolved form)
    pub raw_href: String,
    /// Resolved absolute target; `None` if unparseable or not http(s)
    pub target: Option<Url>,
    /// Visible text, whitespace-collapsed
    pub text: String,
}

/// An immutable fetched page, pre-digested for the heuristic generators.
#[derive(Debug)]
pub struct Page {
    url: Url,
    kind: Option<FeedKind>,
    declared_feeds: Vec<Url>,
    anchors: Vec<Anchor>,
}

impl Page {
    /// Builds a page from its final address and body text.
    ///
    /// If the body classifies as a feed, HTML extraction is skipped: a feed
    /// document has no heuristic candidates, only itself.
    pub fn parse(url: Url, body: &str) -> Page {
        let url = util::normalize(&url);
        let kind = classify(body);
        if kind.is_some() {
            return Page {
                url,
                kind,
                declared_feeds: Vec::new(),
                anchors: Vec::new(),
            };
        }

        let base = util::clean_url(&url);
        let doc = Html::parse_document(body);
        let selector = Selector::parse("link[href], a[href]").expect("static selector");

        let mut declared_feeds = Vec::new();
        let mut anchors = Vec::new();

        for element in doc.select(&selector) {
            let value = element.value();
            let Some(href) = value.attr("href") else {
                continue;
            };
            if href.trim().is_empty() {
                continue;
            }

            if is_declared_feed(value.attr("type"), value.attr("rel")) {
                if let Some(target) = resolve(&base, href) {
                    declared_feeds.push(target);
                }
            }

            if value.name().eq_ignore_ascii_case("a") {
                let text = element
                    .text()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                anchors.push(Anchor {
                    raw_href: href.to_owned(),
                    target: resolve(&base, href),
                    text,
                });
            }
        }

        Page {
            url,
            kind: None,
            declared_feeds,
            anchors,
        }
    }

    /// The page's normalized final address.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The feed flavor of the body itself, if the page *is* a feed.
    pub fn kind(&self) -> Option<FeedKind> {
        self.kind
    }

    /// Declared feed links (`<link>`/`<a>` with a feed type or rel), in
    /// document order, resolved.
    pub fn declared_feeds(&self) -> &[Url] {
        &self.declared_feeds
    }

    /// Every anchor in the document, in document order.
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }
}

/// Whether a type/rel attribute pair declares a feed link.
fn is_declared_feed(type_attr: Option<&str>, rel_attr: Option<&str>) -> bool {
    if let Some(t) = type_attr {
        // Strip parameters: "application/rss+xml; charset=utf-8"
        let mime = t.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        if FEED_MIME_TYPES.contains(&mime.as_str()) {
            return true;
        }
    }
    rel_attr.is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("feed"))
    })
}

/// Resolves an href against the page base; keeps only http(s) targets.
fn resolve(base: &Url, href: &str) -> Option<Url> {
    let joined = base.join(href).ok()?;
    let joined = util::normalize(&joined);
    util::is_http(&joined).then_some(joined)
}
