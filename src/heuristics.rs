//! Candidate generators: each turns an already-fetched [`Page`] into an
//! ordered list of addresses that might be feeds.
//!
//! Generator order is a ranking contract — the orchestrator fully drains
//! one generator before evaluating the next, and single-result callers
//! depend on that order meaning "most authoritative first":
//!
//! 1. [`declared_links`] — the page says so (`<link type="application/rss+xml">`)
//! 2. [`guessed_paths`] — conventional feed locations under this site
//! 3. [`anchor_candidates`] — anchors that merely look feed-ish
//!
//! (The fourth tier, the page's self-classification, needs no generator:
//! the orchestrator reads it straight off the page.)
//!
//! None of these functions touch the network.

use url::Url;

use crate::page::Page;
use crate::util;

/// Conventional feed locations, tried against the page path and the site
/// root. Platform-specific entries (Typo3, Joomla, Blogger, LiveJournal,
/// Posterous, Patch) earn their place by showing up in the wild.
const GUESS_SUFFIXES: &[&str] = &[
    "index.xml",
    "atom.xml",
    "feeds",
    "feeds/default",
    "feed",
    "feed/default",
    "feeds/posts/default/",
    "?feed=rss",
    "?feed=atom",
    "?feed=rss2",
    "?feed=rdf",
    "rss",
    "atom",
    "rdf",
    "index.rss",
    "index.rdf",
    "index.atom",
    "?type=100",              // Typo3
    "?format=feed&type=rss",  // Joomla
    "feeds/posts/default",    // Blogger
    "data/rss",               // LiveJournal
    "rss.xml",                // Posterous
    "articles.rss",           // Patch
    "articles.atom",          // Patch
];

/// High-confidence check: the address ends in a feed file extension.
pub(crate) fn is_feed_url_like(url: &str) -> bool {
    const ENDINGS: [&str; 4] = [".rss", ".rdf", ".atom", ".xml"];
    let lower = url.to_ascii_lowercase();
    ENDINGS.iter().any(|ending| lower.ends_with(ending))
}

/// Moderate-confidence check: the address contains a feed-ish substring.
pub(crate) fn might_be_feed_url(url: &str) -> bool {
    const SUBSTRINGS: [&str; 5] = ["rss", "rdf", "atom", "xml", "feed"];
    let lower = url.to_ascii_lowercase();
    SUBSTRINGS.iter().any(|substring| lower.contains(substring))
}

/// Whether visible text contains a feed keyword as a whole word
/// ("RSS feed" yes, "grsshopper" no).
fn text_has_feed_keyword(text: &str) -> bool {
    const KEYWORDS: [&str; 4] = ["rss", "atom", "feed", "xml"];
    text.to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| KEYWORDS.contains(&word))
}

/// Tier 1: feed links the page itself declares, in document order.
pub fn declared_links(page: &Page) -> Vec<Url> {
    page.declared_feeds().to_vec()
}

/// Tier 2: conventional feed paths joined against the page's cleaned
/// address and against the site root. These mostly won't exist, but when
/// they do they are almost always real feeds.
pub fn guessed_paths(page: &Page) -> Vec<Url> {
    let base = util::clean_url(page.url());
    let root = util::site_root(page.url());

    let mut guesses = Vec::new();
    for suffix in GUESS_SUFFIXES {
        for origin in [&base, &root] {
            if let Ok(joined) = origin.join(suffix) {
                guesses.push(util::normalize(&joined));
            }
        }
    }
    guesses
}

/// Tier 3: anchors that look like they point at a feed, most specific
/// signal first. Three sub-ranks, document order within each:
/// whole-word feed keyword in the visible text, then a feed file extension
/// on the href, then a feed-ish substring anywhere in href or text.
pub fn anchor_candidates(page: &Page) -> Vec<Url> {
    let anchors = page.anchors();
    let mut taken = vec![false; anchors.len()];
    let mut candidates = Vec::new();

    let ranks: [&dyn Fn(&crate::page::Anchor) -> bool; 3] = [
        &|a| text_has_feed_keyword(&a.text),
        &|a| is_feed_url_like(&a.raw_href),
        &|a| might_be_feed_url(&a.raw_href) || might_be_feed_url(&a.text),
    ];

    // Each anchor surfaces once, at its most specific rank
    for rank in ranks {
        for (idx, anchor) in anchors.iter().enumerate() {
            if taken[idx] {
                continue;
            }
            if let Some(target) = &anchor.target {
                if rank(anchor) {
                    taken[idx] = true;
                    candidates.push(target.clone());
                }
            }
        }
    }

    candidates
}

/// Anchor targets on the given origin host, in document order — the pages a
/// spidering search may descend into. Off-host and non-http(s) targets are
/// never returned.
pub fn internal_links(page: &Page, origin: &Url) -> Vec<Url> {
    page.anchors()
        .iter()
        .filter_map(|anchor| anchor.target.clone())
        .filter(|target| util::same_host(target, origin))
        .collect()
}
