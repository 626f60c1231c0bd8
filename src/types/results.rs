//! Pool identities and published match records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name reported when no attribution rule matches
pub const UNKNOWN_POOL: &str = "Unknown";

/// Resolved mining pool identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub name: String,
    pub link: Option<String>,
    pub slug: Option<String>,
}

impl PoolInfo {
    pub fn new(name: impl Into<String>, link: Option<String>, slug: Option<String>) -> Self {
        Self {
            name: name.into(),
            link,
            slug,
        }
    }

    /// Sentinel pool; never carries a slug
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_POOL, None, None)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_POOL && self.slug.is_none()
    }
}

/// Where in a block the marker was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLocation {
    #[serde(rename = "OP_RETURN")]
    OpReturn,
    #[serde(rename = "scriptSig")]
    ScriptSig,
}

impl fmt::Display for MatchLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchLocation::OpReturn => write!(f, "OP_RETURN"),
            MatchLocation::ScriptSig => write!(f, "scriptSig"),
        }
    }
}

/// One matching block, serialised as `{ block, time, pool, logo }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "block")]
    pub block_height: u64,
    #[serde(rename = "time")]
    pub block_time_iso: String,
    #[serde(rename = "pool")]
    pub pool_name: String,
    #[serde(rename = "logo")]
    pub logo_url: String,
    #[serde(skip)]
    pub location: Option<MatchLocation>,
}
