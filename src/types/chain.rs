//! Chain data shapes returned by Esplora-style providers
//!
//! Every field a provider might omit is optional; callers check presence
//! explicitly instead of assuming a field exists.

use serde::{Deserialize, Serialize};

/// Block listing entry (`/blocks`, `/blocks/{height}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Block hash
    pub id: String,
    pub height: u64,
    /// Block header time, seconds since the Unix epoch
    pub timestamp: i64,
}

/// Full block lookup (`/block/{hash}`), including mempool-style extras
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub extras: Option<BlockExtras>,
}

/// Provider-side enrichment attached to a block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockExtras {
    #[serde(default)]
    pub pool: Option<ExtrasPool>,
}

/// Pool identity as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrasPool {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Transaction as listed in `/block/{hash}/txs/{start}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default, rename = "vin")]
    pub inputs: Vec<TxInput>,
    #[serde(default, rename = "vout")]
    pub outputs: Vec<TxOutput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxInput {
    /// Signature script (hex); the coinbase data for a coinbase input
    #[serde(default, rename = "scriptsig")]
    pub script_sig_hex: Option<String>,
    #[serde(default)]
    pub is_coinbase: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(default, rename = "scriptpubkey_type")]
    pub script_type: Option<String>,
    #[serde(default, rename = "scriptpubkey_asm")]
    pub script_asm: Option<String>,
    #[serde(default, rename = "scriptpubkey")]
    pub script_hex: Option<String>,
    #[serde(default, rename = "scriptpubkey_address")]
    pub payout_address: Option<String>,
    #[serde(default)]
    pub value: Option<u64>,
}

impl Transaction {
    /// Signature script of the first input, or "" when absent
    pub fn coinbase_script_sig(&self) -> &str {
        self.inputs
            .first()
            .and_then(|input| input.script_sig_hex.as_deref())
            .unwrap_or("")
    }
}

impl TxOutput {
    /// Output is provably unspendable data carrier (typed or by its assembly)
    pub fn is_op_return(&self) -> bool {
        self.script_type.as_deref() == Some("op_return")
            || self
                .script_asm
                .as_deref()
                .is_some_and(|asm| asm.starts_with("OP_RETURN"))
    }
}
