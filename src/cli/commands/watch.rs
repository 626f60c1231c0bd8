use clap::Args;
use std::sync::Arc;
use tracing::info;

use super::ScanOverrides;
use crate::errors::AppResult;
use crate::live::LiveEvent;
use crate::scanner::SysScanner;

#[derive(Args)]
pub struct WatchCommand {
    #[command(flatten)]
    pub overrides: ScanOverrides,

    /// Tip poll interval in milliseconds (overrides config.toml)
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Keep-alive interval in milliseconds (overrides config.toml)
    #[arg(long)]
    pub keepalive_ms: Option<u64>,
}

impl WatchCommand {
    pub async fn run(&self) -> AppResult<()> {
        let mut config = self.overrides.resolve()?;
        if let Some(poll_ms) = self.poll_ms {
            config.live.poll_interval_ms = poll_ms;
        }
        if let Some(keepalive_ms) = self.keepalive_ms {
            config.live.keepalive_interval_ms = keepalive_ms;
        }

        let scanner = Arc::new(SysScanner::from_config(&config)?);
        let mut subscription = scanner.subscribe_live_updates(&config.live);

        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => println!("{}", render_event(&event)?),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, closing live session");
                    subscription.cancel();
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Event-stream framing: `event:`/`data:` pairs, keep-alives as a comment
pub fn render_event(event: &LiveEvent) -> AppResult<String> {
    let data = match event {
        LiveEvent::Snapshot(results) | LiveEvent::Update(results) => {
            serde_json::to_string(results)?
        }
        LiveEvent::Error { message } => serde_json::json!({ "message": message }).to_string(),
        LiveEvent::KeepAlive => return Ok(": ping\n".to_string()),
    };
    Ok(format!("event: {}\ndata: {}\n", event.name(), data))
}
