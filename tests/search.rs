//! End-to-end search tests against a mock HTTP server.
//!
//! These exercise the whole pipeline — fetch, page model, heuristic tiers,
//! verification, spidering — and pin down the observable contracts: result
//! ordering, at-most-once fetching, depth bounds, deadline behavior, and
//! terminal error mapping.

use std::time::Duration;

use feedscout::{find_feed_url, generate_feed_urls, FeedKind, SearchError, SearchOptions};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Example</title></channel></rss>"#;

const ATOM: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>Example</title></feed>"#;

fn html(head: &str, body: &str) -> String {
    format!("<html><head>{head}</head><body>{body}</body></html>")
}

async fn mount(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Drains a search and returns the result paths, panicking on any error.
async fn collect_paths(client: &reqwest::Client, url: &str, options: &SearchOptions) -> Vec<String> {
    let mut stream = generate_feed_urls(client, url, options);
    let mut paths = Vec::new();
    while let Some(item) = stream.next().await {
        let feed = item.expect("search should not error");
        paths.push(Url::parse(feed.url.as_str()).unwrap().path().to_owned());
    }
    paths
}

async fn requests_to(server: &MockServer, at: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == at)
        .count()
}

#[tokio::test]
async fn test_declared_link_ranks_before_guesses_and_anchors() {
    let server = MockServer::start().await;
    let page = html(
        r#"<link rel="alternate" type="application/atom+xml" href="/real.atom">"#,
        r#"<a href="/updates.rss">subscribe here</a>"#,
    );
    mount(&server, "/", &page).await;
    mount(&server, "/real.atom", ATOM).await;
    mount(&server, "/atom.xml", ATOM).await; // a known-path guess that exists
    mount(&server, "/updates.rss", RSS).await;

    let client = reqwest::Client::new();
    let paths = collect_paths(&client, &server.uri(), &SearchOptions::default()).await;

    // declared link, then known-path guess, then anchor heuristic
    assert_eq!(paths, vec!["/real.atom", "/atom.xml", "/updates.rss"]);
}

#[tokio::test]
async fn test_find_feed_url_returns_most_likely_first() {
    let server = MockServer::start().await;
    let page = html(
        r#"<link type="application/rss+xml" href="/best.rss">"#,
        r#"<a href="/also.rss">rss</a>"#,
    );
    mount(&server, "/", &page).await;
    mount(&server, "/best.rss", RSS).await;
    mount(&server, "/also.rss", RSS).await;

    let client = reqwest::Client::new();
    let feed = find_feed_url(&client, &server.uri(), &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(feed.url.path(), "/best.rss");
    assert_eq!(feed.kind, FeedKind::Rss);
    // lazy: the weaker candidate was never verified
    assert_eq!(requests_to(&server, "/also.rss").await, 0);
}

#[tokio::test]
async fn test_each_address_verified_at_most_once() {
    let server = MockServer::start().await;
    let page = html(
        r#"<link type="application/rss+xml" href="/feed.xml">
           <link type="application/rss+xml" href="/feed.xml">"#,
        r#"<a href="/feed.xml">RSS feed</a>"#,
    );
    mount(&server, "/", &page).await;
    mount(&server, "/feed.xml", RSS).await;

    let client = reqwest::Client::new();
    let paths = collect_paths(&client, &server.uri(), &SearchOptions::default()).await;

    assert_eq!(paths, vec!["/feed.xml"]);
    assert_eq!(requests_to(&server, "/feed.xml").await, 1);
}

#[tokio::test]
async fn test_spider_depth_bound() {
    let server = MockServer::start().await;
    let chain_len = 4;
    for step in 0..chain_len {
        let page = html(
            &format!(r#"<link type="application/rss+xml" href="/{step}.rss">"#),
            &format!(r#"<a href="/{}.html">next</a>"#, step + 1),
        );
        mount(&server, &format!("/{step}.html"), &page).await;
        mount(&server, &format!("/{step}.rss"), RSS).await;
    }

    let client = reqwest::Client::new();
    for depth in 0..3u32 {
        let options = SearchOptions {
            spider: depth,
            ..SearchOptions::default()
        };
        let origin = format!("{}/0.html", server.uri());
        let paths = collect_paths(&client, &origin, &options).await;
        let expected: Vec<String> = (0..=depth).map(|i| format!("/{i}.rss")).collect();
        assert_eq!(paths, expected, "spider={depth}");
    }
}

#[tokio::test]
async fn test_spider_zero_fetches_no_other_page() {
    let server = MockServer::start().await;
    let page = html("", r#"<a href="/other.html">elsewhere</a>"#);
    mount(&server, "/", &page).await;
    mount(
        &server,
        "/other.html",
        &html(r#"<link type="application/rss+xml" href="/hidden.rss">"#, ""),
    )
    .await;
    mount(&server, "/hidden.rss", RSS).await;

    let client = reqwest::Client::new();
    let paths = collect_paths(&client, &server.uri(), &SearchOptions::default()).await;

    assert!(paths.is_empty());
    assert_eq!(requests_to(&server, "/other.html").await, 0);
    assert_eq!(requests_to(&server, "/hidden.rss").await, 0);
}

#[tokio::test]
async fn test_off_host_links_are_not_followed() {
    // The off-host filter drops these before any fetch is attempted, so the
    // search completes without ever resolving the foreign name.
    let server = MockServer::start().await;
    let page = html(
        "",
        r#"<a href="https://other-host.invalid/about">their site</a>"#,
    );
    mount(&server, "/", &page).await;

    let client = reqwest::Client::new();
    let options = SearchOptions {
        spider: 2,
        ..SearchOptions::default()
    };
    let paths = collect_paths(&client, &server.uri(), &options).await;
    assert!(paths.is_empty());
}

#[tokio::test]
async fn test_timeout_stops_search_before_next_fetch() {
    let server = MockServer::start().await;
    let page = html(
        r#"<link type="application/rss+xml" href="/feed.xml">"#,
        "",
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page)
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount(&server, "/feed.xml", RSS).await;

    let client = reqwest::Client::new();
    let options = SearchOptions {
        max_time: Some(Duration::from_millis(100)),
        ..SearchOptions::default()
    };
    let result = find_feed_url(&client, &server.uri(), &options).await;

    assert!(matches!(result, Err(SearchError::Timeout)));
    // The in-flight origin fetch completed, but nothing was fetched after
    // the deadline elapsed
    assert_eq!(requests_to(&server, "/feed.xml").await, 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_feed_found() {
    let server = MockServer::start().await;
    mount(&server, "/", &html("", "<p>nothing to see</p>")).await;

    let client = reqwest::Client::new();
    let paths = collect_paths(&client, &server.uri(), &SearchOptions::default()).await;
    assert!(paths.is_empty());

    let result = find_feed_url(&client, &server.uri(), &SearchOptions::default()).await;
    assert!(matches!(result, Err(SearchError::NoFeedFound)));
}

#[tokio::test]
async fn test_unreachable_origin() {
    let server = MockServer::start().await;
    // nothing mounted: every request 404s

    let client = reqwest::Client::new();
    let result = find_feed_url(&client, &server.uri(), &SearchOptions::default()).await;
    assert!(matches!(result, Err(SearchError::Origin(_))));

    let mut stream = generate_feed_urls(&client, &server.uri(), &SearchOptions::default());
    assert!(stream.next().await.is_none());
    assert!(stream.origin_error().is_some());
}

#[tokio::test]
async fn test_page_that_is_itself_a_feed() {
    let server = MockServer::start().await;
    mount(&server, "/feed", ATOM).await;

    let client = reqwest::Client::new();
    let origin = format!("{}/feed", server.uri());

    let mut stream = generate_feed_urls(&client, &origin, &SearchOptions::default());
    let feed = stream.next().await.unwrap().unwrap();
    assert_eq!(feed.url.path(), "/feed");
    assert_eq!(feed.kind, FeedKind::Atom);
    assert!(stream.next().await.is_none());

    // One fetch total: no heuristic candidates are probed under a feed URL
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_max_links_bounds_verification() {
    let server = MockServer::start().await;
    let page = html(
        r#"<link type="application/rss+xml" href="/a.rss">
           <link type="application/rss+xml" href="/b.rss">
           <link type="application/rss+xml" href="/c.rss">"#,
        "",
    );
    mount(&server, "/", &page).await;
    for name in ["/a.rss", "/b.rss", "/c.rss"] {
        mount(&server, name, RSS).await;
    }

    let client = reqwest::Client::new();
    let options = SearchOptions {
        max_links: Some(2),
        ..SearchOptions::default()
    };
    let paths = collect_paths(&client, &server.uri(), &options).await;

    assert_eq!(paths, vec!["/a.rss", "/b.rss"]);
    assert_eq!(requests_to(&server, "/c.rss").await, 0);
}

#[tokio::test]
async fn test_independent_searches_produce_identical_sequences() {
    let server = MockServer::start().await;
    let page = html(
        r#"<link type="application/atom+xml" href="/primary.atom">"#,
        r#"<a href="/extra.rss">rss</a>"#,
    );
    mount(&server, "/", &page).await;
    mount(&server, "/primary.atom", ATOM).await;
    mount(&server, "/extra.rss", RSS).await;

    let client = reqwest::Client::new();
    let first = collect_paths(&client, &server.uri(), &SearchOptions::default()).await;
    let second = collect_paths(&client, &server.uri(), &SearchOptions::default()).await;

    assert_eq!(first, second);
    assert_eq!(first, vec!["/primary.atom", "/extra.rss"]);
}

#[tokio::test]
async fn test_supplied_html_skips_origin_fetch() {
    let server = MockServer::start().await;
    mount(&server, "/feed.xml", RSS).await;

    let client = reqwest::Client::new();
    let options = SearchOptions {
        html: Some(html(
            r#"<link type="application/rss+xml" href="/feed.xml">"#,
            "",
        )),
        ..SearchOptions::default()
    };
    let origin = format!("{}/page", server.uri());
    let feed = find_feed_url(&client, &origin, &options).await.unwrap();

    assert_eq!(feed.url.path(), "/feed.xml");
    // The declared link resolved in one request; the page was never fetched
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_known_path_guess_finds_conventional_atom() {
    // spec scenario: example.com page whose /atom.xml serves Atom
    let server = MockServer::start().await;
    mount(&server, "/", &html("", "<p>welcome</p>")).await;
    mount(&server, "/atom.xml", ATOM).await;

    let client = reqwest::Client::new();
    let paths = collect_paths(&client, &server.uri(), &SearchOptions::default()).await;
    assert_eq!(paths, vec!["/atom.xml"]);

    let feed = find_feed_url(&client, &server.uri(), &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(feed.url.path(), "/atom.xml");
    assert_eq!(feed.kind, FeedKind::Atom);
}

#[tokio::test]
async fn test_failed_candidate_does_not_stop_the_search() {
    let server = MockServer::start().await;
    let page = html(
        r#"<link type="application/rss+xml" href="/broken.rss">
           <link type="application/rss+xml" href="/works.rss">"#,
        "",
    );
    mount(&server, "/", &page).await;
    Mock::given(method("GET"))
        .and(path("/broken.rss"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount(&server, "/works.rss", RSS).await;

    let client = reqwest::Client::new();
    let feed = find_feed_url(&client, &server.uri(), &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(feed.url.path(), "/works.rss");
}
