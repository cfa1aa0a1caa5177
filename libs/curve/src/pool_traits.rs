//! Pool trait definitions for a unified quoting interface

use crate::curve_math::CurveModel;
use crate::error::CurveError;
use crate::fixed_point::{to_decimal, U256};
use crate::params::{CurveParameters, PoolMode};
use crate::pool::{reciprocal_price, ReservePool, ReserveState};
use crate::quote::{Reserves, TradeQuote};
use rust_decimal::Decimal;

/// Anything that can price trades along a bonding curve
pub trait CurvePool {
    /// Curve evaluator for this pool's parameters
    fn curve(&self) -> &CurveModel;

    fn mode(&self) -> PoolMode;

    /// Reserves and curve position the quotes are computed against
    fn state(&self) -> ReserveState;

    /// Base received for `quote_in`, fee taken from the input
    fn get_base_out(&self, quote_in: U256) -> Result<TradeQuote, CurveError>;

    /// Quote received for `base_in`, fee taken from the output
    fn get_quote_out(&self, base_in: U256) -> Result<TradeQuote, CurveError>;

    /// Minimum gross quote for at least `base_out`
    fn get_quote_in(&self, base_out: U256) -> Result<TradeQuote, CurveError>;

    fn parameters(&self) -> &CurveParameters {
        self.curve().params()
    }

    fn fee_thousandths(&self) -> u16 {
        self.parameters().fee_thousandths
    }

    fn reserves(&self) -> Reserves {
        let state = self.state();
        Reserves::new(state.base_reserve, state.quote_reserve)
    }

    /// Marginal price of base in quote
    fn price_base(&self) -> Result<U256, CurveError> {
        self.curve().price(self.state().supply)
    }

    /// Marginal price of quote in base
    fn price_quote(&self) -> Result<U256, CurveError> {
        reciprocal_price(self.price_base()?)
    }

    /// Percent change of the marginal base price after buying with `quote_in`
    fn price_impact(&self, quote_in: U256) -> Result<Decimal, CurveError> {
        let before = self.price_base()?;
        if before.is_zero() {
            return Err(CurveError::insufficient_liquidity(quote_in, U256::zero()));
        }
        let bought = self.get_base_out(quote_in)?;
        let supply_after = self
            .state()
            .supply
            .checked_add(bought.amount_out)
            .ok_or(CurveError::overflow("price impact"))?;
        let after = self.curve().price(supply_after)?;

        let before = to_decimal(before)?;
        let after = to_decimal(after)?;
        (after - before)
            .checked_div(before)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(CurveError::overflow("price impact"))
    }
}

impl CurvePool for ReservePool {
    fn curve(&self) -> &CurveModel {
        ReservePool::curve(self)
    }

    fn mode(&self) -> PoolMode {
        ReservePool::mode(self)
    }

    fn state(&self) -> ReserveState {
        *ReservePool::state(self)
    }

    fn get_base_out(&self, quote_in: U256) -> Result<TradeQuote, CurveError> {
        self.quote_base_out(quote_in)
    }

    fn get_quote_out(&self, base_in: U256) -> Result<TradeQuote, CurveError> {
        self.quote_quote_out(base_in)
    }

    fn get_quote_in(&self, base_out: U256) -> Result<TradeQuote, CurveError> {
        self.quote_quote_in(base_out)
    }
}
