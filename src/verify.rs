//! Candidate verifier: fetch one candidate address and decide whether it is
//! actually a feed.
//!
//! This is the only place candidate network I/O happens, and nothing here
//! can abort a search — every outcome folds into [`Verification`], and the
//! orchestrator treats `NotFeed` and `FetchFailed` identically (skip and
//! move on).

use std::time::Duration;
use url::Url;

use crate::classify::{classify, FeedKind};
use crate::fetch::{self, FetchError};
use crate::util;

/// A candidate that verified as a real feed. Terminal output of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedFeed {
    /// The candidate address as discovered (normalized)
    pub url: Url,
    /// What flavor of feed lives there
    pub kind: FeedKind,
}

/// Outcome of verifying one candidate.
#[derive(Debug)]
pub enum Verification {
    /// The candidate is a feed
    Feed(VerifiedFeed),
    /// Fetched fine, but the content is not a feed
    NotFeed,
    /// The candidate could not be fetched at all
    FetchFailed(FetchError),
}

/// Fetches a candidate and classifies its content.
pub async fn verify(client: &reqwest::Client, url: &Url, timeout: Duration) -> Verification {
    let fetched = match fetch::fetch_text(client, url, timeout).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Candidate fetch failed");
            return Verification::FetchFailed(e);
        }
    };

    match classify(&fetched.body) {
        Some(kind) => {
            tracing::debug!(url = %url, kind = %kind, "Candidate verified as feed");
            Verification::Feed(VerifiedFeed {
                url: util::normalize(url),
                kind,
            })
        }
        None => {
            tracing::debug!(url = %url, "Candidate is not a feed");
            Verification::NotFeed
        }
    }
}
