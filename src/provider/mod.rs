//! Blockchain data provider integration module
//!
//! This module provides the provider abstraction used by the scanner:
//! - **BlockSource** - Async trait covering the Esplora-style calls the scan needs
//! - **Esplora** - HTTP implementation over reqwest
//! - **Selector** - Picks the first reachable provider and caches it

pub mod esplora;
pub mod selector;

use async_trait::async_trait;

use crate::errors::{ProviderError, ProviderResult};
use crate::types::{BlockDetail, BlockSummary, ExtrasPool, Transaction};

pub use esplora::EsploraClient;
pub use selector::SourceSelector;

/// Esplora-style block data provider
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Label used in logs (the base URL for HTTP providers)
    fn base(&self) -> &str;

    /// Most recent page of blocks, newest first
    async fn list_recent_blocks(&self) -> ProviderResult<Vec<BlockSummary>>;

    /// Page of blocks at or below `height`, newest first
    async fn list_blocks_before(&self, height: u64) -> ProviderResult<Vec<BlockSummary>>;

    async fn get_block(&self, hash: &str) -> ProviderResult<BlockDetail>;

    /// Page `page_index` of the block's transactions (page 0 starts with the coinbase)
    async fn get_transaction_page(
        &self,
        block_hash: &str,
        page_index: usize,
    ) -> ProviderResult<Vec<Transaction>>;

    async fn get_tip_hash(&self) -> ProviderResult<String>;

    /// Provider-supplied pool identity for a block, if any
    async fn get_block_extras(&self, hash: &str) -> ProviderResult<Option<ExtrasPool>> {
        let block = self.get_block(hash).await?;
        Ok(block.extras.and_then(|extras| extras.pool))
    }

    /// Height of the current chain tip
    async fn get_tip_height(&self) -> ProviderResult<u64> {
        let tip_hash = self.get_tip_hash().await?;
        let tip = self.get_block(tip_hash.trim()).await?;
        tip.height.ok_or_else(|| ProviderError::MissingField {
            url: format!("{}/block/{}", self.base(), tip_hash.trim()),
            field: "height".to_string(),
        })
    }
}
