use anyhow::{Context, Result};
use clap::Args;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::script::opreturn::payload_hex_from_asm;
use crate::script::{hex_to_ascii, payload_from_script, MarkerMatcher};

#[derive(Args)]
pub struct DecodeScriptCommand {
    /// OP_RETURN script as raw hex, or as assembly ("OP_RETURN OP_PUSHBYTES_3 737973")
    pub script: String,

    /// ASCII marker to test for (overrides config.toml)
    #[arg(long)]
    pub marker: Option<String>,
}

impl DecodeScriptCommand {
    pub async fn run(&self) -> AppResult<()> {
        let marker = match &self.marker {
            Some(marker) => marker.clone(),
            None => AppConfig::get_defaults().scan.marker,
        };
        let report = decode_report(&self.script, &MarkerMatcher::new(&marker))
            .map_err(|e| AppError::InvalidData(format!("Script decode failed: {:#}", e)))?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

/// Decoded payload summary for one script
///
/// Input that is neither assembly nor hex is an error; a well-formed script
/// that is not a decodable OP_RETURN reports a null payload.
pub fn decode_report(script: &str, matcher: &MarkerMatcher) -> Result<serde_json::Value> {
    let script = script.trim();
    anyhow::ensure!(!script.is_empty(), "Empty script");

    let payload = if script.starts_with("OP_RETURN") {
        payload_hex_from_asm(script)
    } else {
        let bytes = hex::decode(script).context("Script is neither OP_RETURN assembly nor hex")?;
        payload_from_script(&bytes).map(hex::encode)
    };

    Ok(match payload {
        Some(payload) => serde_json::json!({
            "payload_hex": payload,
            "payload_ascii": hex_to_ascii(&payload),
            "marker": matcher.marker(),
            "marker_found": matcher.matches_hex(&payload),
        }),
        None => serde_json::json!({
            "payload_hex": null,
            "marker": matcher.marker(),
            "marker_found": false,
        }),
    })
}
