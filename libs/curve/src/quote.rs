//! Stateless quoting against caller-supplied reserves
//!
//! Routers and UIs hold `(base_reserve, quote_reserve)` pairs read from
//! somewhere else. The curve position is recovered from the quote reserve
//! and every quote runs through the same transition planner the live pool
//! commits with, so a quote and the swap that follows it agree to the unit.

use crate::curve_math::CurveModel;
use crate::error::CurveError;
use crate::fixed_point::U256;
use crate::params::{CurveParameters, PoolMode};
use crate::pool::{CurveEngine, ReserveState};
use crate::pool_traits::CurvePool;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Priced trade, not yet executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuote {
    /// Gross amount the trader pays
    pub amount_in: U256,
    /// Amount the curve sees after the fee
    pub effective_in: U256,
    /// Amount the trader receives
    pub amount_out: U256,
    /// Fee retained by the pool, in the fee-bearing asset
    pub fee: U256,
}

/// Reserve pair as reported by a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reserves {
    pub base_reserve: U256,
    pub quote_reserve: U256,
}

impl Reserves {
    pub fn new(base_reserve: U256, quote_reserve: U256) -> Self {
        Self {
            base_reserve,
            quote_reserve,
        }
    }
}

/// Read-only pool reconstructed from a reserve pair
///
/// The curve position is `inverse_integral(quote_reserve)`. Retained fees
/// and rounding dust can put it slightly above the live pool's position;
/// when the two positions agree the quotes are identical to execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalReserves {
    engine: CurveEngine,
    state: ReserveState,
}

impl ExternalReserves {
    /// Snapshot of a two-sided reserve pool
    pub fn new(params: CurveParameters, reserves: Reserves) -> Result<Self, CurveError> {
        Self::with_mode(params, PoolMode::Reserve, reserves)
    }

    pub fn with_mode(
        params: CurveParameters,
        mode: PoolMode,
        reserves: Reserves,
    ) -> Result<Self, CurveError> {
        let engine = CurveEngine::new(params, mode)?;
        let supply = engine.curve.inverse_integral(reserves.quote_reserve)?;
        Ok(Self {
            engine,
            state: ReserveState {
                base_reserve: reserves.base_reserve,
                quote_reserve: reserves.quote_reserve,
                supply,
            },
        })
    }

    /// Recovered curve position
    pub fn supply(&self) -> U256 {
        self.state.supply
    }
}

impl CurvePool for ExternalReserves {
    fn curve(&self) -> &CurveModel {
        &self.engine.curve
    }

    fn mode(&self) -> PoolMode {
        self.engine.mode
    }

    fn state(&self) -> ReserveState {
        self.state
    }

    fn get_base_out(&self, quote_in: U256) -> Result<TradeQuote, CurveError> {
        Ok(self.engine.plan_buy(&self.state, quote_in)?.0)
    }

    fn get_quote_out(&self, base_in: U256) -> Result<TradeQuote, CurveError> {
        Ok(self.engine.plan_sell(&self.state, base_in)?.0)
    }

    fn get_quote_in(&self, base_out: U256) -> Result<TradeQuote, CurveError> {
        self.engine.plan_exact_base_out(&self.state, base_out)
    }
}

/// Base out for `quote_in` against a reserve pool's reserves
pub fn get_base_out(
    quote_in: U256,
    reserves: Reserves,
    params: &CurveParameters,
) -> Result<TradeQuote, CurveError> {
    ExternalReserves::new(*params, reserves)?.get_base_out(quote_in)
}

/// Quote out for `base_in`; the fee comes off the output
pub fn get_quote_out(
    base_in: U256,
    reserves: Reserves,
    params: &CurveParameters,
) -> Result<TradeQuote, CurveError> {
    ExternalReserves::new(*params, reserves)?.get_quote_out(base_in)
}

/// Minimum gross quote input that buys at least `base_out`
pub fn get_quote_in(
    base_out: U256,
    reserves: Reserves,
    params: &CurveParameters,
) -> Result<TradeQuote, CurveError> {
    ExternalReserves::new(*params, reserves)?.get_quote_in(base_out)
}

pub fn base_price(reserves: Reserves, params: &CurveParameters) -> Result<U256, CurveError> {
    ExternalReserves::new(*params, reserves)?.price_base()
}

pub fn quote_price(reserves: Reserves, params: &CurveParameters) -> Result<U256, CurveError> {
    ExternalReserves::new(*params, reserves)?.price_quote()
}

/// Percentage move of the marginal price caused by buying with `quote_in`
pub fn price_impact(
    quote_in: U256,
    reserves: Reserves,
    params: &CurveParameters,
) -> Result<Decimal, CurveError> {
    ExternalReserves::new(*params, reserves)?.price_impact(quote_in)
}
