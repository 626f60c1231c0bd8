use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::errors::{ProviderResult, ScanError, ScanResult};
use crate::provider::{BlockSource, EsploraClient};

/// Chooses the first reachable provider and keeps it for the process lifetime
///
/// Selection is check, then try candidates, then set, without holding the lock across the
/// attempts. Two concurrent first callers may both try; the first to store wins
/// and the slot is never overwritten afterwards.
pub struct SourceSelector {
    candidates: Vec<Arc<dyn BlockSource>>,
    selected: RwLock<Option<Arc<dyn BlockSource>>>,
}

impl SourceSelector {
    pub fn new(candidates: Vec<Arc<dyn BlockSource>>) -> Self {
        Self {
            candidates,
            selected: RwLock::new(None),
        }
    }

    /// Build Esplora candidates from base URLs, in priority order
    pub fn from_bases(
        bases: &[String],
        timeout_seconds: u64,
        tx_page_size: usize,
    ) -> ProviderResult<Self> {
        let candidates = bases
            .iter()
            .map(|base| {
                EsploraClient::new(base, timeout_seconds, tx_page_size)
                    .map(|client| Arc::new(client) as Arc<dyn BlockSource>)
            })
            .collect::<ProviderResult<Vec<_>>>()?;

        Ok(Self::new(candidates))
    }

    pub fn candidates(&self) -> &[Arc<dyn BlockSource>] {
        &self.candidates
    }

    /// The cached provider, if one has been selected
    pub fn selected(&self) -> Option<Arc<dyn BlockSource>> {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Return the cached provider, probing candidates on first use
    pub async fn select(&self) -> ScanResult<Arc<dyn BlockSource>> {
        if let Some(source) = self.selected() {
            return Ok(source);
        }

        for candidate in &self.candidates {
            match candidate.list_recent_blocks().await {
                Ok(_) => {
                    let mut slot = self
                        .selected
                        .write()
                        .unwrap_or_else(PoisonError::into_inner);
                    let chosen = Arc::clone(slot.get_or_insert_with(|| Arc::clone(candidate)));
                    info!("Selected block data provider {}", chosen.base());
                    return Ok(chosen);
                }
                Err(e) => {
                    warn!("Provider {} unreachable: {}", candidate.base(), e);
                }
            }
        }

        let tried = self
            .candidates
            .iter()
            .map(|candidate| candidate.base())
            .collect::<Vec<_>>()
            .join(", ");
        debug!("All {} provider candidates failed", self.candidates.len());
        Err(ScanError::NoProviderReachable { tried })
    }
}
