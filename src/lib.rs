//! Find the feed URLs a web page points at.
//!
//! Given a page address, this crate discovers RSS/Atom/RDF feed addresses
//! reachable from it: the page's declared `<link>` relations, conventional
//! feed paths under the same site, feed-looking anchors, the page itself if
//! it turns out to *be* a feed — and, optionally, everything the same-host
//! pages it links to declare, via bounded depth-first spidering.
//!
//! Two entry points:
//!
//! - [`find_feed_url`] — the single most likely feed, or a terminal error
//! - [`generate_feed_urls`] — a lazy [`FeedStream`] of every feed found,
//!   best-first; fetching happens only as results are pulled
//!
//! Candidates are verified before being emitted: each one is fetched and
//! its content classified, so every yielded address really served feed XML
//! at search time.
//!
//! # Example
//!
//! ```no_run
//! use feedscout::{find_feed_url, SearchOptions};
//!
//! # async fn example() -> Result<(), feedscout::SearchError> {
//! let client = reqwest::Client::new();
//! let feed = find_feed_url(&client, "https://example.com/blog", &SearchOptions::default()).await?;
//! println!("{} ({})", feed.url, feed.kind);
//! # Ok(())
//! # }
//! ```

mod classify;
mod error;
mod fetch;
mod heuristics;
mod page;
mod search;
mod util;
mod verify;

pub use classify::FeedKind;
pub use error::SearchError;
pub use fetch::FetchError;
pub use search::{FeedStream, SearchOptions};
pub use verify::VerifiedFeed;

/// Finds the single most likely feed for a page.
///
/// Runs the search lazily and stops at the first verified feed, so the
/// cheap, authoritative heuristics usually resolve it in one or two
/// fetches.
///
/// # Errors
///
/// - [`SearchError::Timeout`] — `max_time` elapsed before a feed was found
/// - [`SearchError::Origin`] — the origin page could not be fetched
/// - [`SearchError::NoFeedFound`] — the search completed empty-handed
pub async fn find_feed_url(
    client: &reqwest::Client,
    url: &str,
    options: &SearchOptions,
) -> Result<VerifiedFeed, SearchError> {
    let mut stream = generate_feed_urls(client, url, options);
    match stream.next().await {
        Some(Ok(feed)) => Ok(feed),
        Some(Err(e)) => Err(e),
        None => match stream.into_origin_error() {
            Some(cause) => Err(SearchError::Origin(cause)),
            None => Err(SearchError::NoFeedFound),
        },
    }
}

/// Starts a lazy search for every feed reachable from a page.
///
/// Each call is an independent search: results are deduplicated and
/// addresses fetched at most once *within* one returned stream, and two
/// streams over stable content produce identical sequences. An unreachable
/// origin page yields an empty stream (see [`FeedStream::origin_error`]).
pub fn generate_feed_urls(
    client: &reqwest::Client,
    url: &str,
    options: &SearchOptions,
) -> FeedStream {
    FeedStream::new(client, url, options)
}
