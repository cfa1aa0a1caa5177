//! Curve parameters and pool operating modes

use crate::error::CurveError;
use crate::fixed_point::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Slope denominator shared by every pool of a deployment (m = numerator / 10^6)
pub const SLOPE_DENOMINATOR: u64 = 1_000_000;

/// Largest supported exponent
///
/// Curve math needs `s^(n+1) · slope_numerator` (raw units) below 2^512 and
/// the integral below 2^256, which bounds the reachable supply. Approximate
/// ceilings in whole tokens with the default denominator:
///
/// | exponent | slope 1 (numerator 10^6) | numerator 1 |
/// |----------|--------------------------|-------------|
/// | 1        | 4.8e29                   | 4.8e32      |
/// | 2        | 7.0e19                   | 7.0e21      |
/// | 3        | 8.3e14                   | 2.6e16      |
/// | 4        | 4.2e11                   | 6.7e12      |
/// | 5        | 4.9e6                    | 4.9e7       |
/// | 6        | 1.4e3                    | 1.0e4       |
///
/// Past the ceiling operations return `CurveError::Overflow`.
pub const MAX_EXPONENT: u32 = 6;

/// Fee denominator: fees are expressed in thousandths (3 = 0.3%)
pub const FEE_DENOMINATOR: u16 = 1000;

/// Immutable parameters of one curve instance: `price(s) = m · s^n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveParameters {
    pub slope_numerator: u64,
    pub slope_denominator: u64,
    pub exponent: u32,
    pub fee_thousandths: u16, // Fee in thousandths (3 = 0.3%)
}

impl CurveParameters {
    /// Create validated parameters
    pub fn new(
        slope_numerator: u64,
        slope_denominator: u64,
        exponent: u32,
        fee_thousandths: u16,
    ) -> Result<Self, CurveError> {
        let params = Self {
            slope_numerator,
            slope_denominator,
            exponent,
            fee_thousandths,
        };
        params.validate()?;
        Ok(params)
    }

    /// Parameters using the deployment-wide [`SLOPE_DENOMINATOR`]
    pub fn with_default_denominator(
        slope_numerator: u64,
        exponent: u32,
        fee_thousandths: u16,
    ) -> Result<Self, CurveError> {
        Self::new(slope_numerator, SLOPE_DENOMINATOR, exponent, fee_thousandths)
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        if self.slope_denominator == 0 {
            return Err(CurveError::invalid_parameter(
                "slope denominator must be positive",
            ));
        }
        if self.slope_numerator == 0 {
            return Err(CurveError::invalid_parameter(
                "slope numerator must be positive",
            ));
        }
        if self.exponent == 0 || self.exponent > MAX_EXPONENT {
            return Err(CurveError::invalid_parameter(format!(
                "exponent {} outside 1..={}",
                self.exponent, MAX_EXPONENT
            )));
        }
        if self.fee_thousandths > FEE_DENOMINATOR {
            return Err(CurveError::invalid_parameter(format!(
                "fee {} exceeds {} thousandths",
                self.fee_thousandths, FEE_DENOMINATOR
            )));
        }
        Ok(())
    }

    /// Slope `m` as a decimal, for display
    pub fn slope(&self) -> Decimal {
        Decimal::from(self.slope_numerator) / Decimal::from(self.slope_denominator)
    }
}

/// How base tokens enter and leave the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolMode {
    /// Two-sided pool: base paid out by the curve comes from a deposited reserve
    #[default]
    Reserve,
    /// Base is minted on buys and burned on sells, optionally up to a supply ceiling
    ContinuousMint { supply_cap: Option<U256> },
}

impl PoolMode {
    pub fn is_continuous(&self) -> bool {
        matches!(self, PoolMode::ContinuousMint { .. })
    }

    pub fn supply_cap(&self) -> Option<U256> {
        match self {
            PoolMode::Reserve => None,
            PoolMode::ContinuousMint { supply_cap } => *supply_cap,
        }
    }
}
