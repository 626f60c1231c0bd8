//! Marker scan pipeline
//!
//! - **BlockMatch** - Per-block marker search and pool attribution
//! - **Pager** - Newest-to-oldest block paging until enough matches are found
//! - **SysScanner** - Process-wide facade: provider selection, registry, top-N results

pub mod block_match;
pub mod pager;

use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, LiveConfig};
use crate::errors::{AppResult, ScanResult};
use crate::live::{self, LiveSubscription};
use crate::pools::MetadataLoader;
use crate::provider::{BlockSource, EsploraClient, SourceSelector};
use crate::script::MarkerMatcher;
use crate::types::MatchResult;
use crate::utils::time::timestamp_to_iso8601;

pub use block_match::{BlockMatch, BlockMatcher};
pub use pager::BlockPager;

/// Limits and presentation settings for a scan
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub result_limit: usize,
    pub max_tx_pages: usize,
    pub logo_base: String,
}

impl ScanSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            result_limit: config.scan.result_limit,
            max_tx_pages: config.scan.max_tx_pages,
            logo_base: config.pools.logo_base.trim_end_matches('/').to_string(),
        }
    }

    /// `{logo_base}/{slug}.svg`, or the default logo without a slug
    pub fn logo_url(&self, slug: Option<&str>) -> String {
        format!("{}/{}.svg", self.logo_base, slug.unwrap_or("default"))
    }
}

/// Detection and attribution engine
///
/// Owns the two process-wide caches (selected provider and pool registry);
/// share it behind an `Arc` so every request and live session reuses them.
pub struct SysScanner {
    selector: SourceSelector,
    extras_source: Option<Arc<dyn BlockSource>>,
    metadata: MetadataLoader,
    matcher: MarkerMatcher,
    settings: ScanSettings,
}

impl SysScanner {
    pub fn new(
        selector: SourceSelector,
        extras_source: Option<Arc<dyn BlockSource>>,
        metadata: MetadataLoader,
        matcher: MarkerMatcher,
        settings: ScanSettings,
    ) -> Self {
        Self {
            selector,
            extras_source,
            metadata,
            matcher,
            settings,
        }
    }

    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let providers = &config.providers;
        let selector = SourceSelector::from_bases(
            &providers.esplora_bases,
            providers.timeout_seconds,
            config.scan.tx_page_size,
        )?;

        let extras_source = match &providers.extras_api {
            Some(base) => Some(Arc::new(EsploraClient::new(
                base,
                providers.timeout_seconds,
                config.scan.tx_page_size,
            )?) as Arc<dyn BlockSource>),
            None => None,
        };

        let metadata = MetadataLoader::new(&config.pools.registry_url, providers.timeout_seconds)?;

        Ok(Self::new(
            selector,
            extras_source,
            metadata,
            MarkerMatcher::new(&config.scan.marker),
            ScanSettings::from_config(config),
        ))
    }

    pub fn selector(&self) -> &SourceSelector {
        &self.selector
    }

    /// Most recent marker-carrying blocks, highest first, at most `result_limit`
    pub async fn compute_top8(&self) -> ScanResult<Vec<MatchResult>> {
        let source = self.selector.select().await?;
        let registry = self.metadata.load().await;

        let matcher = BlockMatcher::new(
            source.as_ref(),
            self.extras_source.as_deref(),
            &registry,
            &self.matcher,
            self.settings.max_tx_pages,
        );
        let found = BlockPager::new(source.as_ref(), self.settings.result_limit)
            .collect(&matcher)
            .await?;

        let results = self.rank(found);
        info!(
            "Found {} marker blocks (top height {:?})",
            results.len(),
            results.first().map(|r| r.block_height)
        );
        Ok(results)
    }

    /// Current chain tip height from the selected provider
    pub async fn current_tip_height(&self) -> AppResult<u64> {
        let source = self.selector.select().await?;
        Ok(source.get_tip_height().await?)
    }

    /// Start a live session publishing snapshot/update/error/keepalive events
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe_live_updates(self: &Arc<Self>, config: &LiveConfig) -> LiveSubscription {
        live::subscribe(Arc::clone(self), config)
    }

    /// Sort highest first, drop duplicate heights, truncate, format
    fn rank(&self, mut found: Vec<BlockMatch>) -> Vec<MatchResult> {
        found.sort_by(|a, b| b.block.height.cmp(&a.block.height));
        found.dedup_by_key(|m| m.block.height);
        found.truncate(self.settings.result_limit);

        found
            .into_iter()
            .map(|m| MatchResult {
                block_height: m.block.height,
                block_time_iso: timestamp_to_iso8601(m.block.timestamp),
                logo_url: self.settings.logo_url(m.pool.slug.as_deref()),
                pool_name: m.pool.name,
                location: Some(m.location),
            })
            .collect()
    }
}
