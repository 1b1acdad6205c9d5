//! Feed search orchestrator.
//!
//! [`FeedStream`] is an explicit pull cursor: `next()` is the only public
//! operation, and all search state — the stack of pages being mined, the
//! set of addresses already seen, the depth budget, the deadline — lives in
//! the cursor, not in suspended call frames. Nothing touches the network
//! between `next()` calls, so a caller that stops asking stops all work.
//!
//! Per page, the four candidate tiers are drained strictly in order (the
//! ranking contract described in [`crate::heuristics`]); only then, if depth
//! budget remains, does the search descend depth-first into same-host links
//! in document order. Every address — page or candidate — is fetched at
//! most once per search.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use futures::Stream;
use tokio::time::Instant;
use url::Url;

use crate::error::SearchError;
use crate::fetch::{self, FetchError};
use crate::heuristics;
use crate::page::Page;
use crate::util;
use crate::verify::{self, Verification, VerifiedFeed};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// Candidate tiers, drained in this order per page.
const TIER_DECLARED: usize = 0;
const TIER_GUESSED: usize = 1;
const TIER_ANCHORS: usize = 2;
const TIER_SELF: usize = 3;
const NUM_TIERS: usize = 4;

/// Knobs for one search invocation.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// How many link-hops of same-host pages to descend into (0 = search
    /// only the origin page).
    pub spider: u32,
    /// Overall deadline for the whole search. Checked before every fetch;
    /// once elapsed the stream yields [`SearchError::Timeout`] and ends.
    pub max_time: Option<Duration>,
    /// Upper bound on candidates submitted for verification; reaching it
    /// ends the search as if exhausted.
    pub max_links: Option<usize>,
    /// Per-request fetch timeout. `None` means 10 seconds.
    pub fetch_timeout: Option<Duration>,
    /// Pre-fetched HTML for the origin page, saving the first fetch.
    pub html: Option<String>,
}

impl SearchOptions {
    fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }
}

/// One page currently being mined for candidates.
struct Frame {
    page: Page,
    /// Spider hops still allowed below this page
    remaining_depth: u32,
    /// Next tier to evaluate
    tier: usize,
    /// Candidates generated by the current tier, not yet emitted
    pending: VecDeque<Url>,
    /// Spider targets, filled once the candidate phase is exhausted
    links: Option<VecDeque<Url>>,
}

/// What the synchronous part of the state machine wants done next.
enum Step {
    /// Verify this candidate (network)
    Candidate(Url),
    /// The page body itself is a feed; emit without fetching
    SelfFeed(VerifiedFeed),
    /// Fetch this page and descend into it (network)
    SpiderLink(Url),
}

/// A lazily-evaluated search: a pull-based stream of verified feeds, in
/// best-first discovery order.
///
/// Created by [`generate_feed_urls`](crate::generate_feed_urls). Each
/// cursor owns all of its mutable state; concurrent independent searches
/// share nothing.
pub struct FeedStream {
    client: reqwest::Client,
    options: SearchOptions,
    origin: Option<Url>,
    origin_host: Option<Url>,
    deadline: Option<Instant>,
    seen: HashSet<String>,
    checked: usize,
    stack: Vec<Frame>,
    started: bool,
    finished: bool,
    origin_error: Option<FetchError>,
}

impl FeedStream {
    pub(crate) fn new(client: &reqwest::Client, url: &str, options: &SearchOptions) -> FeedStream {
        let mut options = options.clone();
        let deadline = options.max_time.take().map(|d| Instant::now() + d);
        let (origin, origin_error) = match Url::parse(url) {
            Ok(parsed) => (Some(util::normalize(&parsed)), None),
            Err(e) => (None, Some(FetchError::InvalidUrl(e))),
        };
        FeedStream {
            client: client.clone(),
            options,
            origin,
            origin_host: None,
            deadline,
            seen: HashSet::new(),
            checked: 0,
            stack: Vec::new(),
            started: false,
            finished: false,
            origin_error,
        }
    }

    /// Produces the next verified feed, or `None` when the search is
    /// exhausted.
    ///
    /// This is the sole suspension point: all candidate verification and
    /// spider fetching happens inside this call, lazily, and stops the
    /// moment a feed is found. After the deadline elapses the stream yields
    /// one `Err(SearchError::Timeout)` and then ends; no fetch is started
    /// past the deadline.
    pub async fn next(&mut self) -> Option<Result<VerifiedFeed, SearchError>> {
        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            match self.enter_origin().await {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        loop {
            let Some(step) = self.advance() else {
                self.finished = true;
                return None;
            };

            match step {
                Step::Candidate(url) => {
                    if !self.seen.insert(util::normalized_key(&url)) {
                        continue;
                    }
                    if self.candidate_budget_spent() {
                        self.finished = true;
                        return None;
                    }
                    if self.deadline_elapsed() {
                        self.finished = true;
                        return Some(Err(SearchError::Timeout));
                    }
                    match verify::verify(&self.client, &url, self.options.fetch_timeout()).await
                    {
                        Verification::Feed(feed) => return Some(Ok(feed)),
                        Verification::NotFeed | Verification::FetchFailed(_) => continue,
                    }
                }
                Step::SelfFeed(feed) => {
                    if self.candidate_budget_spent() {
                        self.finished = true;
                        return None;
                    }
                    return Some(Ok(feed));
                }
                Step::SpiderLink(url) => {
                    if !self.seen.insert(util::normalized_key(&url)) {
                        continue;
                    }
                    if self.deadline_elapsed() {
                        self.finished = true;
                        return Some(Err(SearchError::Timeout));
                    }
                    let child_depth = self
                        .stack
                        .last()
                        .map(|frame| frame.remaining_depth.saturating_sub(1))
                        .unwrap_or(0);
                    match fetch::fetch_text(&self.client, &url, self.options.fetch_timeout())
                        .await
                    {
                        Ok(fetched) => {
                            let final_url = util::normalize(&fetched.final_url);
                            self.seen.insert(util::normalized_key(&final_url));
                            // A redirect may land off the origin host; those
                            // pages are never searched
                            let on_host = self
                                .origin_host
                                .as_ref()
                                .is_some_and(|origin| util::same_host(&final_url, origin));
                            if on_host {
                                let page = Page::parse(final_url, &fetched.body);
                                self.push_frame(page, child_depth);
                            }
                        }
                        Err(e) => {
                            tracing::debug!(url = %url, error = %e, "Spider fetch failed");
                        }
                    }
                }
            }
        }
    }

    /// Cause of an empty stream when the origin page itself was the
    /// problem (unreachable, invalid URL, not fetchable).
    pub fn origin_error(&self) -> Option<&FetchError> {
        self.origin_error.as_ref()
    }

    pub(crate) fn into_origin_error(self) -> Option<FetchError> {
        self.origin_error
    }

    /// Adapts the cursor into a [`futures::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<VerifiedFeed, SearchError>> {
        futures::stream::unfold(self, |mut search| async move {
            search.next().await.map(|item| (item, search))
        })
    }

    /// Fetches (or adopts) the origin page and pushes the root frame.
    ///
    /// `Ok(false)` means the stream is empty before it began: unparseable
    /// origin URL or unreachable origin page, recorded in `origin_error`.
    async fn enter_origin(&mut self) -> Result<bool, SearchError> {
        let Some(origin) = self.origin.take() else {
            return Ok(false);
        };

        let page = if let Some(html) = self.options.html.take() {
            self.seen.insert(util::normalized_key(&origin));
            Page::parse(origin, &html)
        } else {
            if self.deadline_elapsed() {
                return Err(SearchError::Timeout);
            }
            match fetch::fetch_text(&self.client, &origin, self.options.fetch_timeout()).await {
                Ok(fetched) => {
                    let final_url = util::normalize(&fetched.final_url);
                    self.seen.insert(util::normalized_key(&origin));
                    self.seen.insert(util::normalized_key(&final_url));
                    Page::parse(final_url, &fetched.body)
                }
                Err(e) => {
                    tracing::debug!(url = %origin, error = %e, "Origin fetch failed");
                    self.origin_error = Some(e);
                    return Ok(false);
                }
            }
        };

        self.origin_host = Some(page.url().clone());
        self.push_frame(page, self.options.spider);
        Ok(true)
    }

    fn push_frame(&mut self, page: Page, remaining_depth: u32) {
        tracing::debug!(url = %page.url(), depth = remaining_depth, "Searching page");
        self.stack.push(Frame {
            page,
            remaining_depth,
            tier: 0,
            pending: VecDeque::new(),
            links: None,
        });
    }

    /// Advances the synchronous state machine to the next action requiring
    /// I/O (or a self-feed emission). Pops frames whose generators and
    /// spider links are exhausted; returns `None` when the stack is empty.
    fn advance(&mut self) -> Option<Step> {
        loop {
            let origin_host = self.origin_host.clone();
            let frame = self.stack.last_mut()?;

            if let Some(url) = frame.pending.pop_front() {
                return Some(Step::Candidate(url));
            }

            if frame.tier < NUM_TIERS {
                let tier = frame.tier;
                frame.tier += 1;

                // A feed document's only candidate is itself; running the
                // guess tier would probe conventional paths under an address
                // already known to serve a feed
                if let Some(kind) = frame.page.kind() {
                    frame.tier = NUM_TIERS;
                    return Some(Step::SelfFeed(VerifiedFeed {
                        url: frame.page.url().clone(),
                        kind,
                    }));
                }

                match tier {
                    TIER_DECLARED => {
                        let urls = heuristics::declared_links(&frame.page);
                        frame.pending.extend(urls);
                    }
                    TIER_GUESSED => {
                        let urls = heuristics::guessed_paths(&frame.page);
                        frame.pending.extend(urls);
                    }
                    TIER_ANCHORS => {
                        let urls = heuristics::anchor_candidates(&frame.page);
                        frame.pending.extend(urls);
                    }
                    // Non-feed page: the self tier has nothing to emit
                    TIER_SELF => {}
                    _ => unreachable!("tier out of range"),
                }
                continue;
            }

            if frame.remaining_depth > 0 {
                let links = frame.links.get_or_insert_with(|| {
                    origin_host
                        .as_ref()
                        .map(|origin| {
                            heuristics::internal_links(&frame.page, origin)
                                .into_iter()
                                .collect()
                        })
                        .unwrap_or_default()
                });
                if let Some(url) = links.pop_front() {
                    return Some(Step::SpiderLink(url));
                }
            }

            // Generators and spider links exhausted; the page is done
            self.stack.pop();
        }
    }

    fn deadline_elapsed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn candidate_budget_spent(&mut self) -> bool {
        if self.options.max_links.is_some_and(|max| self.checked >= max) {
            return true;
        }
        self.checked += 1;
        false
    }
}
