//! Metadata enricher.
//!
//! The enricher is responsible for:
//! - Handing out `coin_id`s in upstream arrival order (`admit`)
//! - Fetching the metadata document through the mirror gateways, in order,
//!   stopping at the first success
//! - Normalizing the image URL and the description
//! - Degrading to the raw event's fields when no document can be fetched
//!
//! Enrichment never fails: every path produces an `EnrichedEvent`.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kanau::processor::Processor;
use thiserror::Error;
use tokenfeed_sdk::objects::{EnrichedEvent, MetadataDocument, RawEvent};
use tracing::{debug, error, warn};
use url::Url;

use crate::config::EnricherConfig;
use crate::utils::content_address::{content_path, gateway_url, normalize_image};
use crate::utils::description::normalize_description;

/// First `coin_id` handed out by a fresh enricher.
pub const FIRST_COIN_ID: u64 = 1;

/// Errors from a single metadata fetch attempt.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Transport or body decoding failure
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The candidate URL could not be parsed
    #[error("invalid metadata URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The gateway answered with a non-2xx status
    #[error("gateway returned status {status}")]
    Status { status: u16 },
}

/// Fetches one metadata document.
///
/// Abstracted so the enricher can be exercised without a network.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<MetadataDocument, EnrichError>;
}

/// `reqwest`-backed [`MetadataFetcher`].
pub struct HttpMetadataFetcher {
    http_client: reqwest::Client,
}

impl HttpMetadataFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &str) -> Result<MetadataDocument, EnrichError> {
        let url = Url::parse(url)?;
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

/// A creation event that has been given its `coin_id` but not yet enriched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    pub coin_id: u64,
    pub raw: RawEvent,
}

/// Turns raw creation events into [`EnrichedEvent`]s.
pub struct MetadataEnricher {
    config: EnricherConfig,
    fetcher: Arc<dyn MetadataFetcher>,
    next_coin_id: AtomicU64,
}

impl MetadataEnricher {
    pub fn new(config: EnricherConfig, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            config,
            fetcher,
            next_coin_id: AtomicU64::new(FIRST_COIN_ID),
        }
    }

    /// Enricher backed by [`HttpMetadataFetcher`] with the configured timeout.
    pub fn with_http(config: EnricherConfig) -> Self {
        let fetcher = Arc::new(HttpMetadataFetcher::new(config.fetch_timeout));
        Self::new(config, fetcher)
    }

    /// Assign the next `coin_id`. Must be called in arrival order.
    pub fn admit(&self, raw: RawEvent) -> PendingEvent {
        PendingEvent {
            coin_id: self.next_coin_id.fetch_add(1, Ordering::Relaxed),
            raw,
        }
    }

    /// URLs to try for a metadata URI, in order.
    ///
    /// Content-addressed URIs are spread over every gateway; anything else
    /// is fetched as-is.
    pub fn candidate_urls(&self, uri: &str) -> Vec<String> {
        match content_path(uri) {
            Some(path) => self
                .config
                .gateways
                .iter()
                .map(|gateway| gateway_url(gateway, path))
                .collect(),
            None => vec![uri.to_string()],
        }
    }

    /// Enrich one admitted event.
    pub async fn enrich(&self, pending: PendingEvent) -> EnrichedEvent {
        let PendingEvent { coin_id, raw } = pending;

        let Some(uri) = raw.uri.as_deref() else {
            error!(coin_id, mint = ?raw.mint, "Creation event has no metadata URI, passing through");
            return self.passthrough(PendingEvent { coin_id, raw });
        };

        match self.fetch_document(coin_id, uri).await {
            Some(document) => self.merge(coin_id, raw, document),
            None => {
                error!(coin_id, mint = ?raw.mint, %uri, "All metadata gateways failed, passing through");
                self.passthrough(PendingEvent { coin_id, raw })
            }
        }
    }

    async fn fetch_document(&self, coin_id: u64, uri: &str) -> Option<MetadataDocument> {
        for url in self.candidate_urls(uri) {
            match self.fetcher.fetch(&url).await {
                Ok(document) => {
                    debug!(coin_id, %url, "Fetched metadata");
                    return Some(document);
                }
                Err(e) => {
                    warn!(coin_id, %url, error = %e, "Metadata fetch failed, trying next gateway");
                }
            }
        }
        None
    }

    fn merge(&self, coin_id: u64, raw: RawEvent, document: MetadataDocument) -> EnrichedEvent {
        EnrichedEvent {
            coin_id,
            name: non_empty(document.name).or(raw.name).unwrap_or_default(),
            symbol: non_empty(document.symbol).or(raw.symbol).unwrap_or_default(),
            description: document
                .description
                .map(|d| normalize_description(&d, self.config.description_cap))
                .unwrap_or_default(),
            image: document
                .image
                .map(|i| normalize_image(&i, &self.config.canonical_image_base))
                .unwrap_or_default(),
            mint: raw.mint.unwrap_or_default(),
            twitter: non_empty(document.twitter),
            website: non_empty(document.website),
        }
    }

    /// The raw fields only, with empty description and image.
    pub fn passthrough(&self, pending: PendingEvent) -> EnrichedEvent {
        let PendingEvent { coin_id, raw } = pending;
        EnrichedEvent {
            coin_id,
            name: raw.name.unwrap_or_default(),
            symbol: raw.symbol.unwrap_or_default(),
            description: String::new(),
            image: String::new(),
            mint: raw.mint.unwrap_or_default(),
            twitter: None,
            website: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Processor<PendingEvent> for MetadataEnricher {
    type Output = EnrichedEvent;
    type Error = Infallible;

    async fn process(&self, pending: PendingEvent) -> Result<EnrichedEvent, Infallible> {
        Ok(self.enrich(pending).await)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const HASH: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

    /// Serves canned documents by URL and records every request.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        pub documents: HashMap<String, MetadataDocument>,
        pub calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MetadataFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<MetadataDocument, EnrichError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.documents
                .get(url)
                .cloned()
                .ok_or(EnrichError::Status { status: 504 })
        }
    }

    fn config() -> EnricherConfig {
        EnricherConfig {
            gateways: vec![
                "https://a.example/ipfs/".into(),
                "https://b.example/ipfs/".into(),
                "https://c.example/ipfs/".into(),
            ],
            ..EnricherConfig::default()
        }
    }

    fn raw(uri: Option<&str>) -> RawEvent {
        RawEvent {
            tx_type: Some("create".into()),
            mint: Some("7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr".into()),
            name: Some("Raw Name".into()),
            symbol: Some("RAW".into()),
            uri: uri.map(str::to_string),
        }
    }

    fn document() -> MetadataDocument {
        MetadataDocument {
            name: Some("Cat Coin".into()),
            symbol: Some("CAT".into()),
            description: Some("The first cat coin.\nCommunity owned, no presale, no team.".into()),
            image: Some(format!("https://ipfs.io/ipfs/{HASH}")),
            twitter: Some("https://x.com/catcoin".into()),
            website: Some(String::new()),
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_next_gateway() {
        let mut fetcher = FakeFetcher::default();
        fetcher
            .documents
            .insert(format!("https://b.example/ipfs/{HASH}"), document());
        let fetcher = Arc::new(fetcher);
        let enricher = MetadataEnricher::new(config(), fetcher.clone());

        let pending = enricher.admit(raw(Some(&format!("https://ipfs.io/ipfs/{HASH}"))));
        let event = enricher.enrich(pending).await;

        assert_eq!(
            *fetcher.calls.lock().unwrap(),
            vec![
                format!("https://a.example/ipfs/{HASH}"),
                format!("https://b.example/ipfs/{HASH}"),
            ]
        );
        assert_eq!(event.name, "Cat Coin");
        assert_eq!(event.symbol, "CAT");
        assert_eq!(event.description, "The first cat coin. Community owned...");
        assert_eq!(
            event.image,
            format!(
                "https://pump.mypinata.cloud/ipfs/{HASH}?img-width=256&img-dpr=2&img-onerror=redirect"
            )
        );
        assert_eq!(event.twitter.as_deref(), Some("https://x.com/catcoin"));
        assert_eq!(event.website, None);
    }

    #[tokio::test]
    async fn test_all_gateways_failing_passes_raw_fields_through() {
        let fetcher = Arc::new(FakeFetcher::default());
        let enricher = MetadataEnricher::new(config(), fetcher.clone());

        let pending = enricher.admit(raw(Some(&format!("ipfs://{HASH}"))));
        let event = enricher.enrich(pending).await;

        assert_eq!(fetcher.calls.lock().unwrap().len(), 3);
        assert_eq!(event.mint, "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr");
        assert_eq!(event.name, "Raw Name");
        assert_eq!(event.description, "");
        assert_eq!(event.image, "");
    }

    #[tokio::test]
    async fn test_missing_uri_skips_fetching() {
        let fetcher = Arc::new(FakeFetcher::default());
        let enricher = MetadataEnricher::new(config(), fetcher.clone());

        let pending = enricher.admit(raw(None));
        let Ok(event) = enricher.process(pending).await;

        assert!(fetcher.calls.lock().unwrap().is_empty());
        assert_eq!(event.symbol, "RAW");
        assert_eq!(event.image, "");
    }

    #[tokio::test]
    async fn test_plain_uri_is_fetched_directly() {
        let mut fetcher = FakeFetcher::default();
        let plain = "https://meta.example/token/1.json";
        fetcher.documents.insert(
            plain.into(),
            MetadataDocument {
                image: Some("https://cdn.example/1.png".into()),
                ..MetadataDocument::default()
            },
        );
        let fetcher = Arc::new(fetcher);
        let enricher = MetadataEnricher::new(config(), fetcher.clone());

        let event = enricher.enrich(enricher.admit(raw(Some(plain)))).await;

        assert_eq!(*fetcher.calls.lock().unwrap(), vec![plain.to_string()]);
        assert_eq!(event.image, "https://cdn.example/1.png");
        // Missing name/symbol in the document fall back to the raw event.
        assert_eq!(event.name, "Raw Name");
    }

    #[test]
    fn test_coin_ids_follow_admission_order() {
        let enricher = MetadataEnricher::new(config(), Arc::new(FakeFetcher::default()));
        let ids: Vec<u64> = (0..4).map(|_| enricher.admit(raw(None)).coin_id).collect();
        assert_eq!(ids, vec![FIRST_COIN_ID, 2, 3, 4]);
    }
}
