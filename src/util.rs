//! URL helpers shared across the search pipeline.
//!
//! Every address the crate compares, deduplicates, or fetches goes through
//! [`normalize`] first, so two spellings of the same feed URL count as one
//! entity. [`clean_url`] produces the join base used by the candidate
//! generators (query arguments on the page URL must not leak into joined
//! candidate paths).

use url::Url;

/// Normalizes a URL to its identity form: parsed (canonical scheme, host,
/// port and percent-encoding) with the fragment stripped.
///
/// Fragments never change what a server returns, so they are irrelevant for
/// the "fetched at most once" guarantee.
pub fn normalize(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Normalized string form of a URL, used as the `SeenSet` key.
pub fn normalized_key(url: &Url) -> String {
    normalize(url).to_string()
}

/// Removes query arguments (and the fragment) from a URL.
///
/// Candidate generators join suffixes and relative hrefs against this
/// cleaned form of the page address.
pub fn clean_url(url: &Url) -> Url {
    let mut cleaned = normalize(url);
    cleaned.set_query(None);
    cleaned
}

/// The root address of a URL's site: same scheme/host/port, path `/`.
pub fn site_root(url: &Url) -> Url {
    let mut root = clean_url(url);
    root.set_path("/");
    root
}

/// Whether two URLs point at the same host.
///
/// `Url` lowercases registered domain names during parsing, so a direct
/// comparison of host strings is sufficient.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => ha == hb,
        _ => false,
    }
}

/// Whether a URL is fetchable by this crate (plain web addresses only).
///
/// Anchors routinely carry `mailto:`, `javascript:` and similar schemes;
/// those are dropped before they can become candidates or spider targets.
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
