use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub providers: ProvidersConfig,
    pub pools: PoolsConfig,
    pub scan: ScanConfig,
    pub live: LiveConfig,
}

/// Esplora-style block data providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Candidate bases in priority order; the first reachable one is used
    pub esplora_bases: Vec<String>,
    /// Provider consulted first for block pool extras
    pub extras_api: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            esplora_bases: vec![
                "https://mempool.space/api".to_string(),
                "https://blockstream.info/api".to_string(),
            ],
            extras_api: Some("https://mempool.space/api".to_string()),
            timeout_seconds: 15,
        }
    }
}

/// Mining pool registry and logo locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolsConfig {
    pub registry_url: String,
    pub logo_base: String,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            registry_url:
                "https://raw.githubusercontent.com/mempool/mining-pools/master/pools-v2.json"
                    .to_string(),
            logo_base: "https://raw.githubusercontent.com/mempool/mining-pool-logos/master"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// ASCII marker searched for in OP_RETURN payloads and coinbase scriptSigs
    pub marker: String,
    pub result_limit: usize,
    /// Hard cap on transaction pages scanned per block
    pub max_tx_pages: usize,
    pub tx_page_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: "sys".to_string(),
            result_limit: 8,
            max_tx_pages: 80,
            tx_page_size: 25,
        }
    }
}

/// Live update session timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    pub poll_interval_ms: u64,
    pub keepalive_interval_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            keepalive_interval_ms: 20_000,
        }
    }
}

impl LiveConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms.max(1))
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration using `file_stem` (extension optional) as the file source
    ///
    /// `SYS_SCAN_<SECTION>__<KEY>` environment variables override the file, e.g.
    /// `SYS_SCAN_SCAN__MARKER=abc` or
    /// `SYS_SCAN_PROVIDERS__ESPLORA_BASES=https://a/api,https://b/api`.
    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            // Start with default values
            .set_default(
                "providers.esplora_bases",
                defaults.providers.esplora_bases.clone(),
            )?
            .set_default(
                "providers.timeout_seconds",
                defaults.providers.timeout_seconds,
            )?
            .set_default("pools.registry_url", defaults.pools.registry_url.clone())?
            .set_default("pools.logo_base", defaults.pools.logo_base.clone())?
            .set_default("scan.marker", defaults.scan.marker.clone())?
            .set_default("scan.result_limit", defaults.scan.result_limit as i64)?
            .set_default("scan.max_tx_pages", defaults.scan.max_tx_pages as i64)?
            .set_default("scan.tx_page_size", defaults.scan.tx_page_size as i64)?
            .set_default("live.poll_interval_ms", defaults.live.poll_interval_ms)?
            .set_default(
                "live.keepalive_interval_ms",
                defaults.live.keepalive_interval_ms,
            )?;

        if let Some(extras_api) = defaults.providers.extras_api {
            builder = builder.set_default("providers.extras_api", extras_api)?;
        }

        let config = builder
            // Load from config file if it exists
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                Environment::with_prefix("SYS_SCAN")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("providers.esplora_bases")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Self {
        // Try to load config for defaults, but don't fail if not found
        Self::load().unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.esplora_bases.is_empty() {
            return Err(ConfigError::Message(
                "providers.esplora_bases must list at least one Esplora base URL".to_string(),
            ));
        }
        if self.scan.marker.is_empty() {
            return Err(ConfigError::Message(
                "scan.marker must not be empty".to_string(),
            ));
        }
        if self.scan.result_limit == 0 || self.scan.tx_page_size == 0 {
            return Err(ConfigError::Message(
                "scan.result_limit and scan.tx_page_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
