//! CLI configuration: built-in defaults, then `ecowatt.toml` in the working
//! directory, then `ECOWATT_*` environment variables.

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use ecowatt_core::bridge::{FreshnessPolicy, DEFAULT_MAX_AGE_HOURS};
use ecowatt_core::CalcResult;

pub const CONFIG_FILE: &str = "ecowatt.toml";
pub const ENV_PREFIX: &str = "ECOWATT_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// JSON file backing the shared project store
    pub store_path: PathBuf,
    /// Name written into store lock files
    pub user_id: String,
    /// Audit hand-offs older than this are ignored
    pub handoff_max_age_hours: i64,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            store_path: PathBuf::from("ecowatt_store.json"),
            user_id: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "ecowatt".to_string()),
            handoff_max_age_hours: DEFAULT_MAX_AGE_HOURS,
            log_filter: "info".to_string(),
        }
    }
}

impl CliConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(CliConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(Self::figment())
    }

    /// Extract and check values that only fail at use time.
    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        let config: CliConfig = figment.extract()?;
        config
            .freshness_policy()
            .map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn freshness_policy(&self) -> CalcResult<FreshnessPolicy> {
        FreshnessPolicy::with_max_age_hours(self.handoff_max_age_hours)
    }
}
