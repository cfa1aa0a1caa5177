//! # Bonding Curve Configuration
//!
//! Configuration loading and tracing setup for hosts embedding the
//! `bonding-curve` engine.
//!
//! ## Features
//!
//! - **Pool Definitions**: slope, exponent, fee and mode per named pool
//! - **Layered Sources**: base TOML file, per-environment overlay, `CURVE_`
//!   environment variables
//! - **Logging**: `tracing-subscriber` with `RUST_LOG` support and JSON output
//!
//! ## Usage
//!
//! ```no_run
//! use curve_config::{init_tracing, EngineConfig};
//! use std::path::Path;
//!
//! let config = EngineConfig::load(Some(Path::new("config/curve.toml")), Some("staging"))?;
//! init_tracing(&config.logging)?;
//! let pools = config.build_pools()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod engine_config;
pub mod logging;

// Re-export commonly used types
pub use engine_config::{
    load_config, EngineConfig, LoggingConfig, ModeSetting, PoolSettings, DEFAULT_CONFIG_PATH,
};
pub use logging::{env_filter, init_tracing, parse_filter};
