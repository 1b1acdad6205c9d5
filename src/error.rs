//! Terminal outcomes of a search.
//!
//! Per-candidate failures are not errors — they eliminate one candidate and
//! the search continues. Only three things end a search abnormally, and
//! they are the three variants here.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors surfaced by [`find_feed_url`](crate::find_feed_url) and by a
/// [`FeedStream`](crate::FeedStream).
#[derive(Debug, Error)]
pub enum SearchError {
    /// The overall deadline (`max_time`) elapsed before the search finished.
    /// No fetch is started after the deadline passes.
    #[error("search deadline exceeded")]
    Timeout,
    /// The origin page itself could not be fetched, so there was nothing to
    /// search.
    #[error("could not fetch origin page: {0}")]
    Origin(FetchError),
    /// The search ran to completion without finding any feed.
    #[error("no feed found")]
    NoFeedFound,
}
