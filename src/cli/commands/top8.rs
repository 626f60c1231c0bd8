use clap::Args;
use tracing::info;

use super::ScanOverrides;
use crate::errors::AppResult;
use crate::scanner::SysScanner;

#[derive(Args)]
pub struct Top8Command {
    #[command(flatten)]
    pub overrides: ScanOverrides,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Top8Command {
    pub async fn run(&self) -> AppResult<()> {
        let config = self.overrides.resolve()?;
        info!(
            "Scanning for marker {:?} via {:?}",
            config.scan.marker, config.providers.esplora_bases
        );

        let scanner = SysScanner::from_config(&config)?;
        let results = scanner.compute_top8().await?;

        let json = if self.pretty {
            serde_json::to_string_pretty(&results)?
        } else {
            serde_json::to_string(&results)?
        };
        println!("{}", json);
        Ok(())
    }
}
