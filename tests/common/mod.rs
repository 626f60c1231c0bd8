//! Common Test Utilities
//!
//! In-memory Esplora stand-in plus builders for coinbase and OP_RETURN
//! transactions, so scanner and live-session tests run without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sys_marker_scan::errors::{ProviderError, ProviderResult};
use sys_marker_scan::pools::{MetadataLoader, PoolRegistry};
use sys_marker_scan::provider::{BlockSource, SourceSelector};
use sys_marker_scan::scanner::{ScanSettings, SysScanner};
use sys_marker_scan::script::MarkerMatcher;
use sys_marker_scan::types::{
    BlockDetail, BlockExtras, BlockSummary, ExtrasPool, Transaction, TxInput, TxOutput,
};

pub const MARKER: &[u8] = b"sys";
pub const LOGO_BASE: &str = "https://logos.example";
pub const BLOCK_PAGE_SIZE: usize = 10;
pub const TX_PAGE_SIZE: usize = 25;
/// 2024-01-01 00:00:00 UTC
pub const BASE_TIMESTAMP: i64 = 1_704_067_200;

pub fn block_hash(height: u64) -> String {
    format!("{:064x}", height)
}

struct MockBlock {
    summary: BlockSummary,
    txs: Vec<Transaction>,
    extras: Option<ExtrasPool>,
}

/// In-memory chain implementing the provider contract
pub struct MockChain {
    base: String,
    blocks: Mutex<BTreeMap<u64, MockBlock>>,
    reachable: AtomicBool,
    /// `list_blocks_before` fails for anchors below this height
    fail_pages_below: Mutex<Option<u64>>,
    recent_calls: AtomicUsize,
    tx_page_calls: Mutex<HashMap<String, usize>>,
    /// Block inserted right after the given `list_recent_blocks` call is served
    late_block: Mutex<Option<(usize, u64, Vec<Transaction>)>>,
}

impl MockChain {
    pub fn new(base: &str) -> Arc<Self> {
        Arc::new(Self {
            base: base.to_string(),
            blocks: Mutex::new(BTreeMap::new()),
            reachable: AtomicBool::new(true),
            fail_pages_below: Mutex::new(None),
            recent_calls: AtomicUsize::new(0),
            tx_page_calls: Mutex::new(HashMap::new()),
            late_block: Mutex::new(None),
        })
    }

    /// Add a block; `txs[0]` is treated as the coinbase
    pub fn add_block(&self, height: u64, txs: Vec<Transaction>, extras: Option<ExtrasPool>) {
        let summary = BlockSummary {
            id: block_hash(height),
            height,
            timestamp: BASE_TIMESTAMP + height as i64 * 600,
        };
        self.blocks.lock().unwrap().insert(
            height,
            MockBlock {
                summary,
                txs,
                extras,
            },
        );
    }

    /// Add blocks `from..=to` with a plain coinbase and no marker
    pub fn add_plain_blocks(&self, from: u64, to: u64) {
        for height in from..=to {
            self.add_block(height, vec![coinbase_tx("/plain miner/", None)], None);
        }
    }

    /// Land block `height` once the `call`-th recent-blocks page has been served
    pub fn land_block_after_recent_call(&self, call: usize, height: u64, txs: Vec<Transaction>) {
        *self.late_block.lock().unwrap() = Some((call, height, txs));
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn fail_pages_below(&self, height: u64) {
        *self.fail_pages_below.lock().unwrap() = Some(height);
    }

    pub fn recent_calls(&self) -> usize {
        self.recent_calls.load(Ordering::SeqCst)
    }

    pub fn tx_page_calls(&self, height: u64) -> usize {
        self.tx_page_calls
            .lock()
            .unwrap()
            .get(&block_hash(height))
            .copied()
            .unwrap_or(0)
    }

    fn unavailable(&self, path: &str) -> ProviderError {
        ProviderError::Status {
            url: format!("{}{}", self.base, path),
            status: 503,
        }
    }

    fn check_reachable(&self, path: &str) -> ProviderResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(self.unavailable(path))
        }
    }

    fn page_at_or_below(&self, height: u64) -> Vec<BlockSummary> {
        self.blocks
            .lock()
            .unwrap()
            .range(..=height)
            .rev()
            .take(BLOCK_PAGE_SIZE)
            .map(|(_, block)| block.summary.clone())
            .collect()
    }
}

#[async_trait]
impl BlockSource for MockChain {
    fn base(&self) -> &str {
        &self.base
    }

    async fn list_recent_blocks(&self) -> ProviderResult<Vec<BlockSummary>> {
        let call = self.recent_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.check_reachable("/blocks")?;
        let page = self.page_at_or_below(u64::MAX);

        let landed = {
            let mut late = self.late_block.lock().unwrap();
            match late.take() {
                Some((due, height, txs)) if due == call => Some((height, txs)),
                other => {
                    *late = other;
                    None
                }
            }
        };
        if let Some((height, txs)) = landed {
            self.add_block(height, txs, None);
        }
        Ok(page)
    }

    async fn list_blocks_before(&self, height: u64) -> ProviderResult<Vec<BlockSummary>> {
        let path = format!("/blocks/{}", height);
        self.check_reachable(&path)?;
        if let Some(limit) = *self.fail_pages_below.lock().unwrap() {
            if height < limit {
                return Err(self.unavailable(&path));
            }
        }
        Ok(self.page_at_or_below(height))
    }

    async fn get_block(&self, hash: &str) -> ProviderResult<BlockDetail> {
        let path = format!("/block/{}", hash);
        self.check_reachable(&path)?;
        let blocks = self.blocks.lock().unwrap();
        let block = blocks
            .values()
            .find(|block| block.summary.id == hash)
            .ok_or_else(|| ProviderError::Status {
                url: format!("{}{}", self.base, path),
                status: 404,
            })?;

        Ok(BlockDetail {
            id: Some(block.summary.id.clone()),
            height: Some(block.summary.height),
            timestamp: Some(block.summary.timestamp),
            extras: block.extras.clone().map(|pool| BlockExtras { pool: Some(pool) }),
        })
    }

    async fn get_transaction_page(
        &self,
        block_hash: &str,
        page_index: usize,
    ) -> ProviderResult<Vec<Transaction>> {
        let path = format!("/block/{}/txs/{}", block_hash, page_index * TX_PAGE_SIZE);
        self.check_reachable(&path)?;
        *self
            .tx_page_calls
            .lock()
            .unwrap()
            .entry(block_hash.to_string())
            .or_insert(0) += 1;

        let blocks = self.blocks.lock().unwrap();
        let block = blocks
            .values()
            .find(|block| block.summary.id == block_hash)
            .ok_or_else(|| self.unavailable(&path))?;

        Ok(block
            .txs
            .iter()
            .skip(page_index * TX_PAGE_SIZE)
            .take(TX_PAGE_SIZE)
            .cloned()
            .collect())
    }

    async fn get_tip_hash(&self) -> ProviderResult<String> {
        self.check_reachable("/blocks/tip/hash")?;
        let blocks = self.blocks.lock().unwrap();
        blocks
            .values()
            .next_back()
            .map(|block| block.summary.id.clone())
            .ok_or_else(|| self.unavailable("/blocks/tip/hash"))
    }
}

/// OP_RETURN script with a single minimal push of `payload`
pub fn op_return_script(payload: &[u8]) -> Vec<u8> {
    let mut script = vec![0x6a];
    script.extend(push(payload));
    script
}

/// Minimal push encoding for `data`
pub fn push(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 5);
    match data.len() {
        len @ 1..=75 => out.push(len as u8),
        len @ 76..=0xff => {
            out.push(0x4c);
            out.push(len as u8);
        }
        len @ 0x100..=0xffff => {
            out.push(0x4d);
            out.extend_from_slice(&(len as u16).to_le_bytes());
        }
        len => {
            out.push(0x4e);
            out.extend_from_slice(&(len as u32).to_le_bytes());
        }
    }
    out.extend_from_slice(data);
    out
}

pub fn op_return_output(payload: &[u8]) -> TxOutput {
    TxOutput {
        script_type: Some("op_return".to_string()),
        script_asm: None,
        script_hex: Some(hex::encode(op_return_script(payload))),
        payout_address: None,
        value: Some(0),
    }
}

pub fn payout_output(address: &str) -> TxOutput {
    TxOutput {
        script_type: Some("v0_p2wpkh".to_string()),
        script_asm: None,
        script_hex: Some(format!("0014{}", "ab".repeat(20))),
        payout_address: Some(address.to_string()),
        value: Some(312_500_000),
    }
}

/// Coinbase whose scriptSig carries `tag` after a BIP34 height push
pub fn coinbase_tx(tag: &str, op_return_payload: Option<&[u8]>) -> Transaction {
    let mut outputs = vec![payout_output("bc1qminerpayout")];
    if let Some(payload) = op_return_payload {
        outputs.push(op_return_output(payload));
    }
    Transaction {
        txid: None,
        inputs: vec![TxInput {
            script_sig_hex: Some(format!("03a0bb0d{}", hex::encode(tag))),
            is_coinbase: Some(true),
        }],
        outputs,
    }
}

/// Ordinary transaction, optionally carrying an OP_RETURN payload
pub fn spend_tx(op_return_payload: Option<&[u8]>) -> Transaction {
    let mut outputs = vec![payout_output("bc1qrecipient")];
    if let Some(payload) = op_return_payload {
        outputs.push(op_return_output(payload));
    }
    Transaction {
        txid: None,
        inputs: vec![TxInput {
            script_sig_hex: Some(String::new()),
            is_coinbase: Some(false),
        }],
        outputs,
    }
}

pub fn test_settings() -> ScanSettings {
    ScanSettings {
        result_limit: 8,
        max_tx_pages: 80,
        logo_base: LOGO_BASE.to_string(),
    }
}

/// Scanner over the given providers with a fixed registry and the "sys" marker
pub fn scanner_over(sources: Vec<Arc<MockChain>>, registry: PoolRegistry) -> SysScanner {
    let candidates = sources
        .into_iter()
        .map(|source| source as Arc<dyn BlockSource>)
        .collect();

    SysScanner::new(
        SourceSelector::new(candidates),
        None,
        MetadataLoader::preloaded(registry),
        MarkerMatcher::new("sys"),
        test_settings(),
    )
}

/// Blocks 100-107 embed "sys" in a coinbase OP_RETURN and are tagged /antpool/;
/// 90-99 and 108-110 carry no marker
pub fn antpool_chain() -> Arc<MockChain> {
    antpool_chain_at("mock://antpool")
}

pub fn antpool_chain_at(base: &str) -> Arc<MockChain> {
    let chain = MockChain::new(base);
    chain.add_plain_blocks(90, 99);
    for height in 100..=107 {
        chain.add_block(
            height,
            vec![coinbase_tx("/antpool/", Some(MARKER)), spend_tx(None)],
            None,
        );
    }
    chain.add_plain_blocks(108, 110);
    chain
}
