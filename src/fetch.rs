//! HTTP collaborator: turn an address into body text.
//!
//! One entry point, [`fetch_text`]: GET with a per-request timeout, redirects
//! followed (the final resolved address is reported for base-URL
//! resolution), transient 5xx responses retried with a short backoff, and
//! the body read as a size-capped stream. Everything the rest of the crate
//! needs to know about a failed fetch is in [`FetchError`].

use futures::StreamExt;
use std::time::Duration;
use url::Url;

use crate::util;

const MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5MB
const MAX_RETRIES: u32 = 3;
// Candidate probes 404/500 as a matter of course, so the backoff base is
// short: 100ms, 200ms, 400ms.
const RETRY_BASE: Duration = Duration::from_millis(100);

/// Errors that can occur while fetching one address.
///
/// All of these are recoverable from the search's point of view: a failed
/// candidate or spider fetch eliminates one address, nothing more.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The address could not be parsed as a URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The address uses a scheme other than http or https
    #[error("unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the per-request timeout
    #[error("request timed out")]
    Timeout,
    /// Response body exceeded the 5MB size limit
    #[error("response too large")]
    TooLarge,
    /// 2xx response with an empty body — nothing to parse or classify
    #[error("empty response body")]
    EmptyBody,
}

/// A successfully fetched document.
#[derive(Debug)]
pub struct Fetched {
    /// Address after redirects, the base for resolving relative hrefs
    pub final_url: Url,
    /// Decoded body text (lossy UTF-8)
    pub body: String,
}

/// Fetches an address and returns its body text plus the final address.
///
/// # Errors
///
/// Returns [`FetchError`] for non-http(s) schemes, transport failures,
/// timeouts, non-2xx statuses (5xx after retries), oversized bodies, and
/// empty bodies.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &Url,
    timeout: Duration,
) -> Result<Fetched, FetchError> {
    if !util::is_http(url) {
        return Err(FetchError::UnsupportedScheme(url.scheme().to_owned()));
    }

    let mut retry_count = 0;
    loop {
        let response = tokio::time::timeout(timeout, client.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        // Transient server errors get a bounded retry with backoff
        if response.status().is_server_error() {
            if retry_count >= MAX_RETRIES {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }
            let delay = RETRY_BASE * 2u32.pow(retry_count);
            tracing::debug!(
                url = %url,
                status = %response.status(),
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "Server error, retrying after delay"
            );
            tokio::time::sleep(delay).await;
            retry_count += 1;
            continue;
        }

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let final_url = response.url().clone();
        let bytes = read_limited_bytes(response).await?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        return Ok(Fetched {
            final_url,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }
}

/// Reads a response body with the size limit enforced during streaming.
async fn read_limited_bytes(response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > MAX_BODY_SIZE {
            return Err(FetchError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > MAX_BODY_SIZE {
            return Err(FetchError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
