use clap::Args;
use tracing::{error, info};

use super::ScanOverrides;
use crate::errors::{AppError, AppResult};
use crate::provider::SourceSelector;

#[derive(Args)]
pub struct TestProvidersCommand {
    #[command(flatten)]
    pub overrides: ScanOverrides,
}

impl TestProvidersCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing block data providers ===");
        let config = self.overrides.resolve()?;
        let selector = SourceSelector::from_bases(
            &config.providers.esplora_bases,
            config.providers.timeout_seconds,
            config.scan.tx_page_size,
        )?;

        let mut reachable = 0;
        for candidate in selector.candidates() {
            match candidate.get_tip_height().await {
                Ok(height) => {
                    reachable += 1;
                    println!("OK    {} (tip height {})", candidate.base(), height);
                }
                Err(e) => {
                    error!("Provider {} failed: {}", candidate.base(), e);
                    println!("FAIL  {} ({})", candidate.base(), e);
                }
            }
        }

        if reachable == 0 {
            return Err(AppError::Config(
                "No configured Esplora base is reachable".to_string(),
            ));
        }
        Ok(())
    }
}
