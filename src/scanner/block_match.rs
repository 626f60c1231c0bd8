use tracing::debug;

use crate::pools::{PoolAttributor, PoolRegistry};
use crate::provider::BlockSource;
use crate::script::{extract_op_return_hex, MarkerMatcher};
use crate::types::{BlockSummary, ExtrasPool, MatchLocation, PoolInfo, Transaction};

/// A block that carries the marker, with its attributed pool
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMatch {
    pub block: BlockSummary,
    pub pool: PoolInfo,
    pub location: MatchLocation,
}

/// Per-block match procedure
///
/// Order: coinbase OP_RETURN outputs, then the coinbase scriptSig, then every
/// transaction's OP_RETURN outputs page by page up to `max_tx_pages`.
/// Provider failures along the way count as absent data.
pub struct BlockMatcher<'a> {
    source: &'a dyn BlockSource,
    extras_source: Option<&'a dyn BlockSource>,
    registry: &'a PoolRegistry,
    matcher: &'a MarkerMatcher,
    max_tx_pages: usize,
}

impl<'a> BlockMatcher<'a> {
    pub fn new(
        source: &'a dyn BlockSource,
        extras_source: Option<&'a dyn BlockSource>,
        registry: &'a PoolRegistry,
        matcher: &'a MarkerMatcher,
        max_tx_pages: usize,
    ) -> Self {
        Self {
            source,
            extras_source,
            registry,
            matcher,
            max_tx_pages,
        }
    }

    pub async fn match_block(&self, block: &BlockSummary) -> Option<BlockMatch> {
        let extras = self.fetch_extras(&block.id).await;

        let mut first_page = match self.source.get_transaction_page(&block.id, 0).await {
            Ok(page) => Some(page),
            Err(e) => {
                debug!("Coinbase fetch failed for block {}: {}", block.height, e);
                None
            }
        };
        let coinbase = first_page.as_ref().and_then(|page| page.first().cloned());

        if let Some(tx) = &coinbase {
            if self.has_matching_op_return(tx) {
                return Some(self.build_match(
                    block,
                    coinbase.as_ref(),
                    extras.as_ref(),
                    MatchLocation::OpReturn,
                ));
            }
            if self.matcher.matches_hex(tx.coinbase_script_sig()) {
                return Some(self.build_match(
                    block,
                    coinbase.as_ref(),
                    extras.as_ref(),
                    MatchLocation::ScriptSig,
                ));
            }
        }

        for page_index in 0..self.max_tx_pages {
            let page = match (page_index, first_page.take()) {
                (0, Some(page)) => page,
                _ => match self.source.get_transaction_page(&block.id, page_index).await {
                    Ok(page) => page,
                    Err(e) => {
                        debug!(
                            "Transaction page {} failed for block {}: {}",
                            page_index, block.height, e
                        );
                        break;
                    }
                },
            };

            if page.is_empty() {
                break;
            }

            if page.iter().any(|tx| self.has_matching_op_return(tx)) {
                return Some(self.build_match(
                    block,
                    coinbase.as_ref(),
                    extras.as_ref(),
                    MatchLocation::OpReturn,
                ));
            }
        }

        None
    }

    /// Extras from the dedicated provider, then the selected one
    async fn fetch_extras(&self, hash: &str) -> Option<ExtrasPool> {
        let sources = self
            .extras_source
            .into_iter()
            .chain(std::iter::once(self.source));

        let mut tried: Vec<&str> = Vec::new();
        for source in sources {
            if tried.contains(&source.base()) {
                continue;
            }
            tried.push(source.base());

            match source.get_block_extras(hash).await {
                Ok(Some(pool)) => return Some(pool),
                Ok(None) => {}
                Err(e) => debug!("Extras lookup via {} failed: {}", source.base(), e),
            }
        }
        None
    }

    fn has_matching_op_return(&self, tx: &Transaction) -> bool {
        tx.outputs
            .iter()
            .filter(|output| output.is_op_return())
            .filter_map(|output| {
                extract_op_return_hex(output.script_asm.as_deref(), output.script_hex.as_deref())
            })
            .any(|payload| self.matcher.matches_hex(&payload))
    }

    fn build_match(
        &self,
        block: &BlockSummary,
        coinbase: Option<&Transaction>,
        extras: Option<&ExtrasPool>,
        location: MatchLocation,
    ) -> BlockMatch {
        let pool = PoolAttributor::new(self.registry).resolve(coinbase, extras);
        debug!(
            "Block {} matched in {} (pool {})",
            block.height, location, pool.name
        );
        BlockMatch {
            block: block.clone(),
            pool,
            location,
        }
    }
}
