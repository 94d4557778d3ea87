//! Configuration management
//!
//! Handles loading and parsing of the optional JSON configuration file, with
//! environment variable overrides for the market-data provider.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::breakout::BreakoutConfig;
use crate::Interval;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub breakout: BreakoutConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Config::default();
            config.apply_env_overrides()?;
            Ok(config)
        }
    }

    /// Provider overrides from the environment (`.env` is honoured)
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        dotenv::dotenv().ok();

        if let Ok(url) = std::env::var("ORB_PROVIDER_URL") {
            self.provider.base_url = url;
        }
        if let Ok(secs) = std::env::var("ORB_TIMEOUT_SECS") {
            self.provider.timeout_secs = secs
                .parse()
                .context(format!("Invalid ORB_TIMEOUT_SECS: {}", secs))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.breakout.validate()?;
        if self.run.lookback_days == 0 {
            anyhow::bail!("run.lookback_days must be at least 1");
        }
        if self.provider.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

/// Market-data provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            timeout_secs: 30,
            user_agent: concat!("orb-scanner/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Points awarded per trade outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub target_points: i64,
    pub stop_points: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            target_points: 2,
            stop_points: -1,
        }
    }
}

/// Defaults for a scan when the command line doesn't say otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub interval: Interval,
    pub lookback_days: u32,
    pub data_dir: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            interval: Interval::default(),
            lookback_days: 30,
            data_dir: "data".to_string(),
        }
    }
}
