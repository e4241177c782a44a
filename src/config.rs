//! Configuration for the roulette ledger
//!
//! Defaults, TOML loading, `ROULETTE_*` environment overrides and validation.

use crate::errors::{ConfigurationError, RouletteResult};
use crate::games::controller::{WagerSettings, DEFAULT_MAX_SELECTORS};
use crate::games::types::{Address, Amount};
use crate::games::vrf_engine::{RandomnessOracle, VrfOracle};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouletteConfig {
    pub wager: WagerConfig,
    pub oracle: OracleConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WagerConfig {
    /// Stake per selection in the smallest native unit
    pub bet_amount: u64,
    /// Selections allowed per bet; 0 disables the limit
    pub max_selectors: usize,
}

impl Default for WagerConfig {
    fn default() -> Self {
        Self {
            bet_amount: 1_000_000_000_000_000, // 0.001 ether in wei
            max_selectors: DEFAULT_MAX_SELECTORS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OracleConfig {
    /// Fee debited from the oracle-fee balance per request
    pub request_fee: u64,
    /// Authorised callback address; derived from `seed` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Hex mini secret for the VRF oracle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub state_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("./roulette_state.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RouletteConfig {
    /// Small stakes and no selection limit, for local experiments
    pub fn development() -> Self {
        Self {
            wager: WagerConfig {
                bet_amount: 1_000,
                max_selectors: 0,
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.wager.bet_amount == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "wager.bet_amount".to_string(),
                value: "0".to_string(),
                reason: "Bet amount must be positive".to_string(),
            });
        }

        if let Some(address) = &self.oracle.address {
            address.parse::<Address>().map_err(|e| ConfigurationError::InvalidValue {
                field: "oracle.address".to_string(),
                value: address.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Some(seed) = &self.oracle.seed {
            VrfOracle::from_seed_hex(seed).map_err(|e| ConfigurationError::InvalidValue {
                field: "oracle.seed".to_string(),
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            })?;
        }

        if self.storage.state_file.as_os_str().is_empty() {
            return Err(ConfigurationError::ValidationFailed(
                "storage.state_file cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn wager_settings(&self) -> WagerSettings {
        WagerSettings {
            bet_amount: self.wager.bet_amount as Amount,
            max_selectors: match self.wager.max_selectors {
                0 => None,
                n => Some(n),
            },
            request_fee: self.oracle.request_fee as Amount,
        }
    }

    /// VRF oracle built from `oracle.seed`, if one is configured
    pub fn vrf_oracle(&self) -> Result<Option<VrfOracle>, ConfigurationError> {
        self.oracle
            .seed
            .as_deref()
            .map(|seed| {
                VrfOracle::from_seed_hex(seed).map_err(|e| ConfigurationError::InvalidValue {
                    field: "oracle.seed".to_string(),
                    value: "<redacted>".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Callback address: explicit `oracle.address`, else derived from the seed
    pub fn oracle_address(&self) -> Result<Option<Address>, ConfigurationError> {
        if let Some(address) = &self.oracle.address {
            let parsed = address.parse().map_err(|e: hex::FromHexError| {
                ConfigurationError::InvalidValue {
                    field: "oracle.address".to_string(),
                    value: address.clone(),
                    reason: e.to_string(),
                }
            })?;
            return Ok(Some(parsed));
        }
        Ok(self.vrf_oracle()?.map(|oracle| oracle.address()))
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> RouletteResult<RouletteConfig> {
        let mut config = match &self.config_path {
            Some(path) => self.load_from_file(path)?,
            None => RouletteConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &Path) -> RouletteResult<RouletteConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut RouletteConfig) -> RouletteResult<()> {
        apply_overrides(config, |key| env::var(key).ok())?;
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &RouletteConfig, path: &Path) -> RouletteResult<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path.display(), e))
                .into()
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: key.to_string(),
        value,
        reason: reason.to_string(),
    })
}

/// Apply `ROULETTE_*` overrides read through `lookup`
pub fn apply_overrides<F>(config: &mut RouletteConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("ROULETTE_BET_AMOUNT") {
        config.wager.bet_amount = parse_var("ROULETTE_BET_AMOUNT", value, "Invalid bet amount")?;
    }
    if let Some(value) = lookup("ROULETTE_MAX_SELECTORS") {
        config.wager.max_selectors =
            parse_var("ROULETTE_MAX_SELECTORS", value, "Invalid selection limit")?;
    }
    if let Some(value) = lookup("ROULETTE_REQUEST_FEE") {
        config.oracle.request_fee = parse_var("ROULETTE_REQUEST_FEE", value, "Invalid request fee")?;
    }
    if let Some(value) = lookup("ROULETTE_ORACLE_ADDRESS") {
        config.oracle.address = Some(value);
    }
    if let Some(value) = lookup("ROULETTE_ORACLE_SEED") {
        config.oracle.seed = Some(value);
    }
    if let Some(value) = lookup("ROULETTE_STATE_FILE") {
        config.storage.state_file = PathBuf::from(value);
    }
    if let Some(value) = lookup("ROULETTE_LOG_LEVEL") {
        config.logging.level = value;
    }
    Ok(())
}

/// Write the default configuration to `path`
pub fn generate_sample_config(path: &Path) -> RouletteResult<()> {
    ConfigLoader::new().save(&RouletteConfig::default(), path)
}
