use tracing::{debug, warn};

use crate::errors::{ScanError, ScanResult};
use crate::provider::BlockSource;
use crate::scanner::block_match::{BlockMatch, BlockMatcher};

/// Walks blocks newest to oldest, one provider page at a time
pub struct BlockPager<'a> {
    source: &'a dyn BlockSource,
    limit: usize,
}

impl<'a> BlockPager<'a> {
    pub fn new(source: &'a dyn BlockSource, limit: usize) -> Self {
        Self { source, limit }
    }

    /// Collect up to `limit` matches
    ///
    /// Stops early on an empty page (end of history) or a failed page fetch,
    /// returning what was found so far. Only a failure on the very first page
    /// is returned as an error.
    pub async fn collect(&self, matcher: &BlockMatcher<'_>) -> ScanResult<Vec<BlockMatch>> {
        let mut page = self
            .source
            .list_recent_blocks()
            .await
            .map_err(|source| ScanError::PageFetchFailed {
                anchor: "tip".to_string(),
                source,
            })?;
        let mut found = Vec::new();

        loop {
            let Some(lowest) = page.iter().map(|block| block.height).min() else {
                debug!("Empty block page, end of history");
                break;
            };

            for block in &page {
                if let Some(matched) = matcher.match_block(block).await {
                    found.push(matched);
                    if found.len() >= self.limit {
                        return Ok(found);
                    }
                }
            }

            let Some(anchor) = lowest.checked_sub(1) else {
                break;
            };

            page = match self.source.list_blocks_before(anchor).await {
                // Guard against a provider repeating heights already scanned
                Ok(next) => next
                    .into_iter()
                    .filter(|block| block.height <= anchor)
                    .collect(),
                Err(source) => {
                    let err = ScanError::PageFetchFailed {
                        anchor: anchor.to_string(),
                        source,
                    };
                    warn!("{}; keeping {} partial matches", err, found.len());
                    break;
                }
            };
        }

        Ok(found)
    }
}
