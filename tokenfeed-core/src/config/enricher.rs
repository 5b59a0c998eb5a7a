use std::time::Duration;

/// Metadata enrichment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnricherConfig {
    /// Mirror gateway prefixes, tried in order. Each is joined with the
    /// content path of the metadata URI.
    pub gateways: Vec<String>,
    /// Base used when rewriting content-addressed image URLs.
    pub canonical_image_base: String,
    /// Maximum description length in characters, before the `...` marker.
    pub description_cap: usize,
    /// Per-request timeout for a single gateway fetch.
    pub fetch_timeout: Duration,
}

impl EnricherConfig {
    pub const DEFAULT_GATEWAYS: [&str; 4] = [
        "https://ipfs.io/ipfs/",
        "https://cloudflare-ipfs.com/ipfs/",
        "https://gateway.pinata.cloud/ipfs/",
        "https://dweb.link/ipfs/",
    ];
    pub const DEFAULT_CANONICAL_IMAGE_BASE: &str = "https://pump.mypinata.cloud/ipfs";
    pub const DEFAULT_DESCRIPTION_CAP: usize = 35;
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            gateways: Self::DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect(),
            canonical_image_base: Self::DEFAULT_CANONICAL_IMAGE_BASE.to_string(),
            description_cap: Self::DEFAULT_DESCRIPTION_CAP,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
        }
    }
}
