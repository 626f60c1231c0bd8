//! Pool attribution
//!
//! Priority, first hit wins:
//! 1. Provider extras (slug backfilled from the registry alias table)
//! 2. Registry coinbase tag patterns, in registry order
//! 3. Built-in fallback tags, in fixed order
//! 4. Registry payout addresses, in coinbase output order
//! 5. `Unknown`

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::pools::PoolRegistry;
use crate::script::hex_to_ascii;
use crate::types::{ExtrasPool, PoolInfo, Transaction, UNKNOWN_POOL};

struct FallbackTag {
    regex: Regex,
    name: &'static str,
    slug: &'static str,
    link: &'static str,
}

fn fallback(pattern: &str, name: &'static str, slug: &'static str, link: &'static str) -> FallbackTag {
    FallbackTag {
        regex: RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("built-in pool pattern must compile"),
        name,
        slug,
        link,
    }
}

lazy_static! {
    static ref FALLBACK_TAGS: Vec<FallbackTag> = vec![
        fallback("(secpool|sec *pool)", "SECPOOL", "secpool", "https://www.secpool.com"),
        fallback("(spider ?pool|spiderpool)", "SpiderPool", "spiderpool", "https://www.spiderpool.com"),
        fallback("(binance( *pool)?|bnbpool)", "Binance Pool", "binancepool", "https://pool.binance.com"),
        fallback("(mining *squared|miningsquared|bsquared)", "Mining Squared", "miningsquared", "https://miningsquared.com"),
        fallback("(foundry|foundryusa)", "Foundry USA", "foundryusa", "https://foundrydigital.com"),
        fallback("(antpool)", "AntPool", "antpool", "https://www.antpool.com"),
        fallback("(f2pool)", "F2Pool", "f2pool", "https://www.f2pool.com"),
        fallback("(viabtc)", "ViaBTC", "viabtc", "https://www.viabtc.com"),
        fallback("(btc[.]com|btccom)", "BTC.com", "btccom", "https://pool.btc.com"),
        fallback("(luxor)", "Luxor", "luxor", "https://mining.luxor.tech"),
        fallback("(sbi.*crypto)", "SBI Crypto", "sbicrypto", "https://www.sbicrypto.com"),
        fallback("(mara|marapool)", "MARA Pool", "marapool", "https://www.mara.xyz"),
    ];
}

/// Resolves the pool that mined a block
pub struct PoolAttributor<'a> {
    registry: &'a PoolRegistry,
}

impl<'a> PoolAttributor<'a> {
    pub fn new(registry: &'a PoolRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, coinbase: Option<&Transaction>, extras: Option<&ExtrasPool>) -> PoolInfo {
        if let Some(pool) = extras.and_then(|extras| self.from_extras(extras)) {
            debug!("Pool {} from provider extras", pool.name);
            return pool;
        }

        let coinbase_text = hex_to_ascii(coinbase.map_or("", Transaction::coinbase_script_sig));

        if let Some(pool) = self.from_registry_tags(&coinbase_text) {
            debug!("Pool {} from registry coinbase tag", pool.name);
            return pool;
        }

        if let Some(pool) = from_fallback_tags(&coinbase_text) {
            debug!("Pool {} from built-in coinbase tag", pool.name);
            return pool;
        }

        if let Some(pool) = coinbase.and_then(|tx| self.from_payout_addresses(tx)) {
            debug!("Pool {} from payout address", pool.name);
            return pool;
        }

        PoolInfo::unknown()
    }

    fn from_extras(&self, extras: &ExtrasPool) -> Option<PoolInfo> {
        if extras.name.is_none() && extras.slug.is_none() {
            return None;
        }

        let slug = extras.slug.clone().or_else(|| {
            extras
                .name
                .as_deref()
                .and_then(|name| self.registry.slug_for(name))
                .map(str::to_string)
        });

        Some(PoolInfo::new(
            extras.name.clone().unwrap_or_else(|| UNKNOWN_POOL.to_string()),
            extras.link.clone(),
            slug,
        ))
    }

    fn from_registry_tags(&self, coinbase_text: &str) -> Option<PoolInfo> {
        self.registry
            .tag_patterns()
            .iter()
            .find(|entry| entry.pattern.is_match(coinbase_text))
            .map(|entry| entry.pool.clone())
    }

    fn from_payout_addresses(&self, coinbase: &Transaction) -> Option<PoolInfo> {
        coinbase
            .outputs
            .iter()
            .filter_map(|output| output.payout_address.as_deref())
            .find_map(|address| self.registry.payout_pool(address))
            .cloned()
    }
}

fn from_fallback_tags(coinbase_text: &str) -> Option<PoolInfo> {
    FALLBACK_TAGS
        .iter()
        .find(|tag| tag.regex.is_match(coinbase_text))
        .map(|tag| {
            PoolInfo::new(
                tag.name,
                Some(tag.link.to_string()),
                Some(tag.slug.to_string()),
            )
        })
}
