//! Helpers for content-addressed (IPFS) URLs.
//!
//! Two URL forms are recognised:
//!
//! - any URL with an `/ipfs/<hash>` path segment, e.g.
//!   `https://ipfs.io/ipfs/QmHash` or `https://x.mypinata.cloud/ipfs/QmHash?foo`
//! - the `ipfs://<hash>` scheme (optionally `ipfs://ipfs/<hash>`)

const IPFS_SCHEME: &str = "ipfs://";
const IPFS_SEGMENT: &str = "/ipfs/";

/// Query appended to every rewritten image URL.
pub const IMAGE_SIZING_QUERY: &str = "img-width=256&img-dpr=2&img-onerror=redirect";

/// Extract the content path (hash plus any sub-path) from a URL.
///
/// Query strings and fragments are dropped. Returns `None` when the URL is
/// not content-addressed.
pub fn content_path(uri: &str) -> Option<&str> {
    let rest = match uri.strip_prefix(IPFS_SCHEME) {
        Some(rest) => rest.strip_prefix("ipfs/").unwrap_or(rest),
        None => {
            let start = uri.find(IPFS_SEGMENT)? + IPFS_SEGMENT.len();
            &uri[start..]
        }
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let path = rest[..end].trim_matches('/');
    (!path.is_empty()).then_some(path)
}

/// Join a gateway prefix and a content path.
pub fn gateway_url(gateway: &str, path: &str) -> String {
    format!("{}/{}", gateway.trim_end_matches('/'), path)
}

/// Rewrite a content-addressed image URL onto the canonical gateway with
/// the standard sizing query. Other URLs are returned unchanged.
pub fn normalize_image(image: &str, canonical_base: &str) -> String {
    match content_path(image) {
        Some(path) => format!("{}?{IMAGE_SIZING_QUERY}", gateway_url(canonical_base, path)),
        None => image.to_string(),
    }
}
