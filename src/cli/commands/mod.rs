//! CLI subcommands
//!
//! Thin wrappers over the scanner core: configuration overrides in, JSON or
//! event-stream text out.

pub mod decode;
pub mod test_providers;
pub mod top8;
pub mod watch;

use clap::Args;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};

/// Overrides shared by commands that talk to providers
#[derive(Args, Debug, Clone, Default)]
pub struct ScanOverrides {
    /// Esplora base URL; repeat to give several candidates in priority order (overrides config.toml)
    #[arg(long = "esplora-base")]
    pub esplora_bases: Vec<String>,

    /// Pool registry URL (overrides config.toml)
    #[arg(long)]
    pub registry_url: Option<String>,

    /// ASCII marker to search for (overrides config.toml)
    #[arg(long)]
    pub marker: Option<String>,
}

impl ScanOverrides {
    /// Load configuration or use defaults, then apply CLI arguments
    pub fn resolve(&self) -> AppResult<AppConfig> {
        let mut config = AppConfig::get_defaults();

        if !self.esplora_bases.is_empty() {
            config.providers.esplora_bases = self.esplora_bases.clone();
        }
        if let Some(url) = &self.registry_url {
            config.pools.registry_url = url.clone();
        }
        if let Some(marker) = &self.marker {
            if marker.is_empty() {
                return Err(AppError::Config("--marker must not be empty".to_string()));
            }
            config.scan.marker = marker.clone();
        }

        Ok(config)
    }
}
