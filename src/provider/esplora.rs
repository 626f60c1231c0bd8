use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::errors::{ProviderError, ProviderResult};
use crate::provider::BlockSource;
use crate::types::{BlockDetail, BlockSummary, Transaction};

/// Esplora REST client (mempool.space / blockstream.info flavour)
#[derive(Debug, Clone)]
pub struct EsploraClient {
    base: String,
    http: Client,
    tx_page_size: usize,
}

impl EsploraClient {
    /// Create a client for `base` (e.g. `https://mempool.space/api`)
    pub fn new(base: &str, timeout_seconds: u64, tx_page_size: usize) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::from_reqwest(base, e))?;

        Ok(Self::with_client(base, http, tx_page_size))
    }

    /// Reuse an existing reqwest client
    pub fn with_client(base: &str, http: Client, tx_page_size: usize) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http,
            tx_page_size,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_response(&self, path: &str) -> ProviderResult<(String, reqwest::Response)> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url,
                status: status.as_u16(),
            });
        }

        Ok((url, response))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ProviderResult<T> {
        let (url, response) = self.get_response(path).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode {
                url,
                message: e.to_string(),
            })
    }

    async fn get_text(&self, path: &str) -> ProviderResult<String> {
        let (url, response) = self.get_response(path).await?;
        response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(&url, e))
    }
}

#[async_trait]
impl BlockSource for EsploraClient {
    fn base(&self) -> &str {
        &self.base
    }

    async fn list_recent_blocks(&self) -> ProviderResult<Vec<BlockSummary>> {
        self.get_json("/blocks").await
    }

    async fn list_blocks_before(&self, height: u64) -> ProviderResult<Vec<BlockSummary>> {
        self.get_json(&format!("/blocks/{}", height)).await
    }

    async fn get_block(&self, hash: &str) -> ProviderResult<BlockDetail> {
        self.get_json(&format!("/block/{}", hash)).await
    }

    async fn get_transaction_page(
        &self,
        block_hash: &str,
        page_index: usize,
    ) -> ProviderResult<Vec<Transaction>> {
        // Esplora pages by transaction start index, in multiples of the page size
        let start_index = page_index * self.tx_page_size;
        self.get_json(&format!("/block/{}/txs/{}", block_hash, start_index))
            .await
    }

    async fn get_tip_hash(&self) -> ProviderResult<String> {
        let hash = self.get_text("/blocks/tip/hash").await?;
        let hash = hash.trim();
        if hash.is_empty() {
            return Err(ProviderError::MissingField {
                url: self.url("/blocks/tip/hash"),
                field: "tip hash".to_string(),
            });
        }
        Ok(hash.to_string())
    }
}
