use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use feedscout::{find_feed_url, generate_feed_urls, SearchError, SearchOptions};

/// Find the most likely feed URL for a webpage.
#[derive(Parser)]
#[command(name = "feedscout", version, about)]
struct Args {
    /// URL of the webpage to search from
    url: String,

    /// How many times to follow same-host links from the page (0 = this page only)
    #[arg(long, default_value_t = 0)]
    spider: u32,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    max_time: Option<f64>,

    /// Maximum candidate links to check as feeds
    #[arg(long, value_name = "N")]
    max_links: Option<usize>,

    /// Find all feeds under the provided URL, not just the most likely one
    #[arg(long)]
    all: bool,

    /// Read the page's HTML from a file to save the first web fetch
    #[arg(long, value_name = "PATH")]
    html_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let html = match &args.html_file {
        Some(path) => Some(std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read HTML file '{}'", path.display())
        })?),
        None => None,
    };

    let options = SearchOptions {
        spider: args.spider,
        max_time: args.max_time.map(Duration::from_secs_f64),
        max_links: args.max_links,
        html,
        ..SearchOptions::default()
    };

    let client = reqwest::Client::new();
    let mut found = Vec::new();

    if args.all {
        let mut stream = generate_feed_urls(&client, &args.url, &options);
        while let Some(item) = stream.next().await {
            match item {
                Ok(feed) => found.push(feed),
                Err(e) => {
                    // Deadline hit mid-search: report it, keep partial results
                    eprintln!("{e}");
                    break;
                }
            }
        }
    } else {
        match find_feed_url(&client, &args.url, &options).await {
            Ok(feed) => found.push(feed),
            Err(SearchError::NoFeedFound) => {}
            Err(e) => return Err(e.into()),
        }
    }

    if found.is_empty() {
        eprintln!("No feed found");
        std::process::exit(1);
    }

    for feed in found {
        println!("{}", feed.url);
    }
    Ok(())
}
