use reqwest::Client;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::{ScanError, ScanResult};
use crate::pools::PoolRegistry;

/// Loads the pool registry once and serves it for the process lifetime
///
/// A failed load still initialises the slot, with an empty registry, so the
/// fetch is never retried and attribution always has something to consult.
pub struct MetadataLoader {
    url: Option<String>,
    http: Client,
    slot: RwLock<Option<Arc<PoolRegistry>>>,
}

impl MetadataLoader {
    pub fn new(url: &str, timeout_seconds: u64) -> ScanResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ScanError::RegistryLoadFailed(format!("HTTP client: {}", e)))?;

        Ok(Self {
            url: Some(url.to_string()),
            http,
            slot: RwLock::new(None),
        })
    }

    /// Loader that never fetches and serves `registry`
    pub fn preloaded(registry: PoolRegistry) -> Self {
        Self {
            url: None,
            http: Client::new(),
            slot: RwLock::new(Some(Arc::new(registry))),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<Arc<PoolRegistry>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The registry, fetching it on first use
    pub async fn load(&self) -> Arc<PoolRegistry> {
        if let Some(registry) = self.current() {
            return registry;
        }

        let registry = match self.fetch().await {
            Ok(registry) => {
                info!(
                    "Loaded pool registry: {} tag patterns",
                    registry.tag_patterns().len()
                );
                registry
            }
            Err(e) => {
                warn!("{}; attributing with built-in pool tags only", e);
                PoolRegistry::empty()
            }
        };

        // First writer wins; a racing duplicate load is discarded
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slot.get_or_insert_with(|| Arc::new(registry)))
    }

    async fn fetch(&self) -> ScanResult<PoolRegistry> {
        let Some(url) = &self.url else {
            return Ok(PoolRegistry::empty());
        };

        let response = self
            .http
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| ScanError::RegistryLoadFailed(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(ScanError::RegistryLoadFailed(format!(
                "{}: HTTP {}",
                url,
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScanError::RegistryLoadFailed(format!("{}: {}", url, e)))?;

        PoolRegistry::from_json(&body)
    }
}
