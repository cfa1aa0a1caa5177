//! Engine Configuration Module
//!
//! Loads pool definitions and logging settings from TOML files with
//! environment-specific overlays and `CURVE_` environment variable overrides.

use anyhow::{bail, Context, Result};
use bonding_curve::{from_decimal, CurveParameters, PoolMode, ReservePool, SLOPE_DENOMINATOR};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Default location of the engine configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/curve.toml";

/// Top-level engine configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pools keyed by name
    #[serde(default)]
    pub pools: BTreeMap<String, PoolSettings>,
}

/// Tracing output settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"bonding_curve=debug,warn"`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_slope_denominator() -> u64 {
    SLOPE_DENOMINATOR
}

/// How a configured pool sources its base tokens
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModeSetting {
    #[default]
    Reserve,
    ContinuousMint,
}

/// One configured pool
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PoolSettings {
    pub slope_numerator: u64,

    #[serde(default = "default_slope_denominator")]
    pub slope_denominator: u64,

    pub exponent: u32,

    #[serde(default)]
    pub fee_thousandths: u16,

    #[serde(default)]
    pub mode: ModeSetting,

    /// Ceiling on curve supply in whole tokens ("21000000", "1.5");
    /// continuous-mint pools only
    pub supply_cap: Option<String>,

    pub description: Option<String>,
}

impl PoolSettings {
    pub fn to_parameters(&self) -> Result<CurveParameters> {
        CurveParameters::new(
            self.slope_numerator,
            self.slope_denominator,
            self.exponent,
            self.fee_thousandths,
        )
        .context("Invalid curve parameters")
    }

    pub fn to_mode(&self) -> Result<PoolMode> {
        let supply_cap = match &self.supply_cap {
            Some(raw) => {
                let tokens = Decimal::from_str(raw.trim())
                    .with_context(|| format!("Invalid supply cap '{}'", raw))?;
                Some(from_decimal(tokens).with_context(|| format!("Invalid supply cap '{}'", raw))?)
            }
            None => None,
        };

        match (self.mode, supply_cap) {
            (ModeSetting::Reserve, Some(_)) => {
                bail!("supply_cap only applies to continuous_mint pools")
            }
            (ModeSetting::Reserve, None) => Ok(PoolMode::Reserve),
            (ModeSetting::ContinuousMint, supply_cap) => Ok(PoolMode::ContinuousMint { supply_cap }),
        }
    }

    /// Fresh, empty pool for these settings
    pub fn build_pool(&self) -> Result<ReservePool> {
        let params = self.to_parameters()?;
        let mode = self.to_mode()?;
        ReservePool::with_mode(params, mode).context("Failed to create pool")
    }
}

impl EngineConfig {
    /// Load configuration from files with environment overrides
    ///
    /// Overlay files live next to the base file under
    /// `environments/{environment}.toml`.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        if let Some(env) = environment {
            let env_file = overlay_path(base, env);
            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // CURVE_LOGGING__LEVEL=debug, CURVE_POOLS__LAUNCH__FEE_THOUSANDTHS=5
        builder = builder.add_source(
            Environment::with_prefix("CURVE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(pools = config.pools.len(), "configuration loaded");
        Ok(config)
    }

    /// Parse a configuration document without file or environment sources
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check every pool's parameters and mode
    pub fn validate(&self) -> Result<()> {
        for (name, settings) in &self.pools {
            settings
                .to_parameters()
                .and_then(|_| settings.to_mode())
                .with_context(|| format!("Pool '{}' is misconfigured", name))?;
        }
        Ok(())
    }

    pub fn get_pool(&self, name: &str) -> Option<&PoolSettings> {
        self.pools.get(name)
    }

    /// One empty pool per configured entry
    pub fn build_pools(&self) -> Result<BTreeMap<String, ReservePool>> {
        self.pools
            .iter()
            .map(|(name, settings)| {
                let pool = settings
                    .build_pool()
                    .with_context(|| format!("Pool '{}' is misconfigured", name))?;
                Ok((name.clone(), pool))
            })
            .collect()
    }
}

fn overlay_path(base: &Path, environment: &str) -> PathBuf {
    base.parent()
        .unwrap_or(Path::new("."))
        .join("environments")
        .join(format!("{}.toml", environment))
}

/// Convenience function to load configuration from the default path
pub fn load_config(environment: Option<&str>) -> Result<EngineConfig> {
    EngineConfig::load(None, environment)
}
