//! Reserve pool state machine
//!
//! A pool is either **Empty** (no supply, no reserves) or **Active**. Every
//! transition is planned against an immutable snapshot first and committed
//! in a single assignment, so a rejected call leaves `(base_reserve,
//! quote_reserve, supply)` untouched.
//!
//! Hosts must serialize calls per pool; mutation takes `&mut self` and there
//! is no internal locking.

use crate::curve_math::CurveModel;
use crate::error::CurveError;
use crate::fee::FeePolicy;
use crate::fixed_point::{mul_div, U256, WAD};
use crate::params::{CurveParameters, PoolMode};
use crate::quote::TradeQuote;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Mutable reserves of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReserveState {
    /// Base tokens available to the curve
    pub base_reserve: U256,
    /// Quote tokens held, including retained fees
    pub quote_reserve: U256,
    /// Curve position `s`; not the same as `base_reserve`
    pub supply: U256,
}

impl ReserveState {
    pub fn is_empty(&self) -> bool {
        self.base_reserve.is_zero() && self.quote_reserve.is_zero() && self.supply.is_zero()
    }
}

/// Result of a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositOutcome {
    /// Base backing the added quote liquidity; the settlement layer transfers it out
    pub base_amount_out: U256,
    /// Curve position after the deposit
    pub supply: U256,
}

/// Reserves released by a full withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub base_out: U256,
    pub quote_out: U256,
}

/// Curve, fee and mode of a pool, shared by live pools and reserve snapshots
///
/// All methods are pure: they take a state and return the state that would
/// follow, which is what makes quotes and mutations agree bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CurveEngine {
    pub(crate) curve: CurveModel,
    pub(crate) fee: FeePolicy,
    pub(crate) mode: PoolMode,
}

impl CurveEngine {
    pub(crate) fn new(params: CurveParameters, mode: PoolMode) -> Result<Self, CurveError> {
        Ok(Self {
            curve: CurveModel::new(params)?,
            fee: FeePolicy::new(params.fee_thousandths)?,
            mode,
        })
    }

    pub(crate) fn plan_deposit(
        &self,
        state: &ReserveState,
        base_in: U256,
        quote_in: U256,
    ) -> Result<(DepositOutcome, ReserveState), CurveError> {
        if base_in.is_zero() && quote_in.is_zero() {
            return Err(CurveError::invalid_amount("deposit of zero base and zero quote"));
        }
        if self.mode.is_continuous() && !base_in.is_zero() {
            return Err(CurveError::invalid_amount(
                "continuous-mint pools hold no base reserve",
            ));
        }

        let base_reserve = state
            .base_reserve
            .checked_add(base_in)
            .ok_or_else(|| {
                CurveError::invalid_amount("deposit would overflow the base reserve")
            })?;

        if quote_in.is_zero() {
            let next = ReserveState {
                base_reserve,
                ..*state
            };
            let outcome = DepositOutcome {
                base_amount_out: U256::zero(),
                supply: state.supply,
            };
            return Ok((outcome, next));
        }

        let supply = self.curve.advance(state.supply, quote_in)?;
        let consumed = supply
            .checked_sub(state.supply)
            .ok_or(CurveError::overflow("deposit advance"))?;
        let next = ReserveState {
            base_reserve: self.release_base(base_reserve, state.supply, consumed)?,
            quote_reserve: state
                .quote_reserve
                .checked_add(quote_in)
                .ok_or_else(|| {
                    CurveError::invalid_amount("deposit would overflow the quote reserve")
                })?,
            supply,
        };
        let outcome = DepositOutcome {
            base_amount_out: consumed,
            supply,
        };
        Ok((outcome, next))
    }

    /// Quote in, base out; the fee is taken from the input
    pub(crate) fn plan_buy(
        &self,
        state: &ReserveState,
        quote_in: U256,
    ) -> Result<(TradeQuote, ReserveState), CurveError> {
        if quote_in.is_zero() {
            return Err(CurveError::invalid_amount("quote input must be positive"));
        }

        let effective_in = self.fee.apply(quote_in)?;
        let supply = self.curve.advance(state.supply, effective_in)?;
        let base_out = supply
            .checked_sub(state.supply)
            .ok_or(CurveError::overflow("buy advance"))?;

        let next = ReserveState {
            base_reserve: self.release_base(state.base_reserve, state.supply, base_out)?,
            // Gross amount stays in the pool; the fee is the surplus over the integral
            quote_reserve: state
                .quote_reserve
                .checked_add(quote_in)
                .ok_or_else(|| {
                    CurveError::invalid_amount("buy would overflow the quote reserve")
                })?,
            supply,
        };
        let quote = TradeQuote {
            amount_in: quote_in,
            effective_in,
            amount_out: base_out,
            fee: quote_in - effective_in,
        };
        Ok((quote, next))
    }

    /// Base in, quote out; the fee is taken from the output
    pub(crate) fn plan_sell(
        &self,
        state: &ReserveState,
        base_in: U256,
    ) -> Result<(TradeQuote, ReserveState), CurveError> {
        if base_in.is_zero() {
            return Err(CurveError::invalid_amount("base input must be positive"));
        }
        if base_in > state.supply {
            return Err(CurveError::invalid_amount(format!(
                "cannot sell {} base against curve supply {}",
                base_in, state.supply
            )));
        }

        let supply = state.supply - base_in;
        let gross_out = self
            .curve
            .integral(state.supply)?
            .checked_sub(self.curve.integral(supply)?)
            .ok_or(CurveError::overflow("sell integral"))?;
        let quote_out = self.fee.apply(gross_out)?;
        if quote_out > state.quote_reserve {
            return Err(CurveError::insufficient_liquidity(
                quote_out,
                state.quote_reserve,
            ));
        }

        let base_reserve = match self.mode {
            PoolMode::Reserve => state
                .base_reserve
                .checked_add(base_in)
                .ok_or_else(|| {
                    CurveError::invalid_amount("sell would overflow the base reserve")
                })?,
            // Burned
            PoolMode::ContinuousMint { .. } => state.base_reserve,
        };
        let next = ReserveState {
            base_reserve,
            quote_reserve: state.quote_reserve - quote_out,
            supply,
        };
        let quote = TradeQuote {
            amount_in: base_in,
            effective_in: base_in,
            amount_out: quote_out,
            fee: gross_out - quote_out,
        };
        Ok((quote, next))
    }

    /// Cheapest quote-for-base trade that yields at least `base_out`
    ///
    /// Integer roots round the curve position, so the cheapest trade can
    /// deliver more than `base_out`. Liquidity is checked against what that
    /// trade actually releases: a request that fits the reserve exactly may
    /// still fail with `InsufficientLiquidity` naming the larger amount.
    pub(crate) fn plan_exact_base_out(
        &self,
        state: &ReserveState,
        base_out: U256,
    ) -> Result<TradeQuote, CurveError> {
        if base_out.is_zero() {
            return Err(CurveError::invalid_amount("requested base output must be positive"));
        }
        let target = state
            .supply
            .checked_add(base_out)
            .ok_or_else(|| CurveError::invalid_amount("requested base output exceeds curve range"))?;

        let effective = self.curve.quote_to_reach(state.supply, target)?;
        let gross = self.fee.gross_for(effective)?;
        let (quote, _) = self.plan_buy(state, gross)?;
        debug_assert!(quote.amount_out >= base_out);
        Ok(quote)
    }

    pub(crate) fn price_base(&self, state: &ReserveState) -> Result<U256, CurveError> {
        self.curve.price(state.supply)
    }

    pub(crate) fn price_quote(&self, state: &ReserveState) -> Result<U256, CurveError> {
        reciprocal_price(self.price_base(state)?)
    }

    /// Base reserve left after `amount` leaves the curve at position `supply_before`
    fn release_base(
        &self,
        base_reserve: U256,
        supply_before: U256,
        amount: U256,
    ) -> Result<U256, CurveError> {
        match self.mode {
            PoolMode::Reserve => {
                if amount > base_reserve {
                    return Err(CurveError::insufficient_liquidity(amount, base_reserve));
                }
                Ok(base_reserve - amount)
            }
            PoolMode::ContinuousMint { supply_cap } => {
                if let Some(cap) = supply_cap {
                    let headroom = cap.saturating_sub(supply_before);
                    if amount > headroom {
                        return Err(CurveError::insufficient_liquidity(amount, headroom));
                    }
                }
                Ok(base_reserve)
            }
        }
    }
}

/// Quote-asset price of one base unit's reciprocal: `WAD² / price`
pub(crate) fn reciprocal_price(price: U256) -> Result<U256, CurveError> {
    if price.is_zero() {
        // No curve supply to price against
        return Err(CurveError::insufficient_liquidity(WAD, U256::zero()));
    }
    mul_div(WAD, WAD, price)
}

fn check_slippage(actual: U256, minimum: U256) -> Result<(), CurveError> {
    if actual < minimum {
        return Err(CurveError::SlippageExceeded { minimum, actual });
    }
    Ok(())
}

/// One bonding-curve pool and its reserves
#[derive(Debug, Clone)]
pub struct ReservePool {
    engine: CurveEngine,
    state: ReserveState,
}

impl ReservePool {
    /// Empty two-sided reserve pool
    pub fn new(params: CurveParameters) -> Result<Self, CurveError> {
        Self::with_mode(params, PoolMode::Reserve)
    }

    /// Empty continuous-mint curve, optionally capped
    pub fn continuous(
        params: CurveParameters,
        supply_cap: Option<U256>,
    ) -> Result<Self, CurveError> {
        Self::with_mode(params, PoolMode::ContinuousMint { supply_cap })
    }

    pub fn with_mode(params: CurveParameters, mode: PoolMode) -> Result<Self, CurveError> {
        let engine = CurveEngine::new(params, mode)?;
        debug!(
            slope = %params.slope(),
            exponent = params.exponent,
            fee_thousandths = params.fee_thousandths,
            ?mode,
            "created bonding curve pool"
        );
        Ok(Self {
            engine,
            state: ReserveState::default(),
        })
    }

    /// Restore a pool from persisted reserves
    ///
    /// Rejects states whose quote reserve is below the curve integral or
    /// whose supply exceeds the mode's cap.
    pub fn from_state(
        params: CurveParameters,
        mode: PoolMode,
        state: ReserveState,
    ) -> Result<Self, CurveError> {
        let engine = CurveEngine::new(params, mode)?;
        let implied = engine.curve.integral(state.supply)?;
        if state.quote_reserve < implied {
            return Err(CurveError::invalid_parameter(format!(
                "quote reserve {} below curve integral {} at supply {}",
                state.quote_reserve, implied, state.supply
            )));
        }
        if let Some(cap) = mode.supply_cap() {
            if state.supply > cap {
                return Err(CurveError::invalid_parameter(format!(
                    "supply {} exceeds cap {}",
                    state.supply, cap
                )));
            }
        }
        Ok(Self { engine, state })
    }

    pub fn params(&self) -> &CurveParameters {
        self.engine.curve.params()
    }

    pub fn mode(&self) -> PoolMode {
        self.engine.mode
    }

    pub fn curve(&self) -> &CurveModel {
        &self.engine.curve
    }

    pub fn state(&self) -> &ReserveState {
        &self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Add liquidity; quote liquidity moves the curve and releases the backing base
    pub fn deposit(&mut self, base_in: U256, quote_in: U256) -> Result<DepositOutcome, CurveError> {
        let (outcome, next) = self
            .engine
            .plan_deposit(&self.state, base_in, quote_in)
            .inspect_err(|e| warn!(error = %e, "deposit rejected"))?;
        self.state = next;
        debug!(
            base_in = %base_in,
            quote_in = %quote_in,
            base_amount_out = %outcome.base_amount_out,
            supply = %next.supply,
            "deposit committed"
        );
        Ok(outcome)
    }

    /// Drain both reserves and reset the curve
    pub fn withdraw(&mut self) -> Withdrawal {
        let withdrawal = Withdrawal {
            base_out: self.state.base_reserve,
            quote_out: self.state.quote_reserve,
        };
        self.state = ReserveState::default();
        debug!(
            base_out = %withdrawal.base_out,
            quote_out = %withdrawal.quote_out,
            "pool drained"
        );
        withdrawal
    }

    pub fn swap_quote_for_base(&mut self, quote_in: U256) -> Result<U256, CurveError> {
        self.swap_quote_for_base_min(quote_in, U256::zero())
    }

    /// Swap quote for base, failing if fewer than `min_base_out` would be paid
    pub fn swap_quote_for_base_min(
        &mut self,
        quote_in: U256,
        min_base_out: U256,
    ) -> Result<U256, CurveError> {
        let (quote, next) = self
            .engine
            .plan_buy(&self.state, quote_in)
            .and_then(|planned| {
                check_slippage(planned.0.amount_out, min_base_out)?;
                Ok(planned)
            })
            .inspect_err(|e| warn!(error = %e, quote_in = %quote_in, "quote->base swap rejected"))?;
        self.state = next;
        debug!(
            quote_in = %quote_in,
            fee = %quote.fee,
            base_out = %quote.amount_out,
            supply = %next.supply,
            "swapped quote for base"
        );
        Ok(quote.amount_out)
    }

    pub fn swap_base_for_quote(&mut self, base_in: U256) -> Result<U256, CurveError> {
        self.swap_base_for_quote_min(base_in, U256::zero())
    }

    /// Swap base for quote, failing if fewer than `min_quote_out` would be paid
    pub fn swap_base_for_quote_min(
        &mut self,
        base_in: U256,
        min_quote_out: U256,
    ) -> Result<U256, CurveError> {
        let (quote, next) = self
            .engine
            .plan_sell(&self.state, base_in)
            .and_then(|planned| {
                check_slippage(planned.0.amount_out, min_quote_out)?;
                Ok(planned)
            })
            .inspect_err(|e| warn!(error = %e, base_in = %base_in, "base->quote swap rejected"))?;
        self.state = next;
        debug!(
            base_in = %base_in,
            fee = %quote.fee,
            quote_out = %quote.amount_out,
            supply = %next.supply,
            "swapped base for quote"
        );
        Ok(quote.amount_out)
    }

    /// Preview of [`swap_quote_for_base`](Self::swap_quote_for_base)
    pub fn quote_base_out(&self, quote_in: U256) -> Result<TradeQuote, CurveError> {
        Ok(self.engine.plan_buy(&self.state, quote_in)?.0)
    }

    /// Preview of [`swap_base_for_quote`](Self::swap_base_for_quote)
    pub fn quote_quote_out(&self, base_in: U256) -> Result<TradeQuote, CurveError> {
        Ok(self.engine.plan_sell(&self.state, base_in)?.0)
    }

    /// Minimum gross quote input for at least `base_out`
    pub fn quote_quote_in(&self, base_out: U256) -> Result<TradeQuote, CurveError> {
        self.engine.plan_exact_base_out(&self.state, base_out)
    }

    /// Marginal price of base in quote at the current curve position
    pub fn price_base(&self) -> Result<U256, CurveError> {
        self.engine.price_base(&self.state)
    }

    /// Marginal price of quote in base (reciprocal of [`price_base`](Self::price_base))
    pub fn price_quote(&self) -> Result<U256, CurveError> {
        self.engine.price_quote(&self.state)
    }

    /// Quote held above the curve integral: retained fees plus rounding dust
    pub fn surplus(&self) -> Result<U256, CurveError> {
        let implied = self.engine.curve.integral(self.state.supply)?;
        self.state
            .quote_reserve
            .checked_sub(implied)
            .ok_or_else(|| CurveError::invalid_parameter("quote reserve below curve integral"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::{expand_to_wad, parse_units};

    fn params(fee: u16) -> CurveParameters {
        CurveParameters::new(1_000_000, 1_000_000, 1, fee).unwrap()
    }

    fn seeded_pool(fee: u16) -> ReservePool {
        let mut pool = ReservePool::new(params(fee)).unwrap();
        pool.deposit(expand_to_wad(1_000), U256::zero()).unwrap();
        pool
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = ReservePool::new(params(0)).unwrap();
        assert!(pool.is_empty());
        assert_eq!(pool.price_base().unwrap(), U256::zero());
        assert!(matches!(
            pool.price_quote(),
            Err(CurveError::InsufficientLiquidity { .. })
        ));
    }

    #[test]
    fn test_base_only_deposit_keeps_curve_at_origin() {
        let mut pool = ReservePool::new(params(0)).unwrap();
        let outcome = pool.deposit(expand_to_wad(1_000), U256::zero()).unwrap();

        assert_eq!(outcome.base_amount_out, U256::zero());
        assert_eq!(pool.state().supply, U256::zero());
        assert_eq!(pool.state().base_reserve, expand_to_wad(1_000));
        assert!(!pool.is_empty());
    }

    #[test]
    fn test_quote_deposit_releases_backing_base() {
        let mut pool = ReservePool::new(params(0)).unwrap();
        let outcome = pool
            .deposit(expand_to_wad(1_000_000_000), expand_to_wad(50))
            .unwrap();

        assert_eq!(outcome.base_amount_out, expand_to_wad(10));
        assert_eq!(outcome.supply, expand_to_wad(10));
        assert_eq!(
            pool.state().base_reserve,
            expand_to_wad(1_000_000_000) - expand_to_wad(10)
        );
        assert_eq!(pool.state().quote_reserve, expand_to_wad(50));
        assert_eq!(pool.price_base().unwrap(), expand_to_wad(10));
        assert_eq!(pool.price_quote().unwrap(), parse_units("0.1").unwrap());
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut pool = ReservePool::new(params(0)).unwrap();
        assert!(matches!(
            pool.deposit(U256::zero(), U256::zero()),
            Err(CurveError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_quote_deposit_without_base_backing() {
        let mut pool = ReservePool::new(params(0)).unwrap();
        let result = pool.deposit(expand_to_wad(5), expand_to_wad(50));
        assert_eq!(
            result,
            Err(CurveError::insufficient_liquidity(
                expand_to_wad(10),
                expand_to_wad(5)
            ))
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn test_swap_quote_for_base() {
        let mut pool = seeded_pool(0);
        let base_out = pool.swap_quote_for_base(expand_to_wad(50)).unwrap();

        assert_eq!(base_out, expand_to_wad(10));
        assert_eq!(pool.state().supply, expand_to_wad(10));
        assert_eq!(pool.state().base_reserve, expand_to_wad(990));
        assert_eq!(pool.state().quote_reserve, expand_to_wad(50));
        assert_eq!(pool.surplus().unwrap(), U256::zero());
    }

    #[test]
    fn test_fee_stays_in_pool() {
        let mut pool = seeded_pool(3);
        let base_out = pool.swap_quote_for_base(expand_to_wad(50)).unwrap();

        assert_eq!(base_out, U256::from(9_984_988_733_093_292_779u128));
        // Gross input is booked; the 0.15 fee is surplus over the integral
        assert_eq!(pool.state().quote_reserve, expand_to_wad(50));
        assert_eq!(
            pool.surplus().unwrap(),
            parse_units("0.150000000000000009").unwrap()
        );
    }

    #[test]
    fn test_swap_base_for_quote() {
        let mut pool = seeded_pool(0);
        pool.swap_quote_for_base(expand_to_wad(50)).unwrap();

        let quote_out = pool.swap_base_for_quote(expand_to_wad(4)).unwrap();
        // F(10) - F(6) = 50 - 18
        assert_eq!(quote_out, expand_to_wad(32));
        assert_eq!(pool.state().supply, expand_to_wad(6));
        assert_eq!(pool.state().base_reserve, expand_to_wad(994));
        assert_eq!(pool.state().quote_reserve, expand_to_wad(18));
    }

    #[test]
    fn test_sell_fee_taken_from_output() {
        let mut pool = seeded_pool(3);
        pool.deposit(U256::zero(), expand_to_wad(50)).unwrap();

        let quote = pool.quote_quote_out(expand_to_wad(10)).unwrap();
        assert_eq!(quote.amount_out, parse_units("49.85").unwrap());
        assert_eq!(quote.fee, parse_units("0.15").unwrap());
        assert_eq!(quote.effective_in, expand_to_wad(10));
    }

    #[test]
    fn test_sell_beyond_supply_rejected_atomically() {
        let mut pool = seeded_pool(0);
        pool.swap_quote_for_base(expand_to_wad(50)).unwrap();
        let before = *pool.state();

        assert!(matches!(
            pool.swap_base_for_quote(expand_to_wad(11)),
            Err(CurveError::InvalidAmount { .. })
        ));
        assert_eq!(*pool.state(), before);
    }

    #[test]
    fn test_buy_beyond_base_reserve_rejected_atomically() {
        let mut pool = ReservePool::new(params(0)).unwrap();
        pool.deposit(expand_to_wad(5), U256::zero()).unwrap();
        let before = *pool.state();

        let result = pool.swap_quote_for_base(expand_to_wad(50));
        assert_eq!(
            result,
            Err(CurveError::insufficient_liquidity(
                expand_to_wad(10),
                expand_to_wad(5)
            ))
        );
        assert_eq!(*pool.state(), before);
    }

    #[test]
    fn test_zero_trades_rejected() {
        let mut pool = seeded_pool(0);
        assert!(matches!(
            pool.swap_quote_for_base(U256::zero()),
            Err(CurveError::InvalidAmount { .. })
        ));
        assert!(matches!(
            pool.swap_base_for_quote(U256::zero()),
            Err(CurveError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_slippage_bounds() {
        let mut pool = seeded_pool(0);
        let before = *pool.state();

        let result = pool.swap_quote_for_base_min(expand_to_wad(50), expand_to_wad(11));
        assert_eq!(
            result,
            Err(CurveError::SlippageExceeded {
                minimum: expand_to_wad(11),
                actual: expand_to_wad(10),
            })
        );
        assert_eq!(*pool.state(), before);

        let base_out = pool
            .swap_quote_for_base_min(expand_to_wad(50), expand_to_wad(10))
            .unwrap();
        assert!(pool
            .swap_base_for_quote_min(base_out, expand_to_wad(51))
            .is_err());
        assert_eq!(
            pool.swap_base_for_quote_min(base_out, expand_to_wad(50))
                .unwrap(),
            expand_to_wad(50)
        );
    }

    #[test]
    fn test_withdraw_drains_and_resets() {
        let mut pool = seeded_pool(3);
        pool.swap_quote_for_base(expand_to_wad(20)).unwrap();
        let state = *pool.state();

        let withdrawal = pool.withdraw();
        assert_eq!(withdrawal.base_out, state.base_reserve);
        assert_eq!(withdrawal.quote_out, state.quote_reserve);
        assert!(pool.is_empty());

        // Empty pools can be reseeded
        pool.deposit(expand_to_wad(100), U256::zero()).unwrap();
        assert!(pool.swap_quote_for_base(expand_to_wad(50)).unwrap() > U256::zero());
    }

    #[test]
    fn test_quote_in_for_exact_base_out() {
        let pool = seeded_pool(3);
        let quote = pool.quote_quote_in(expand_to_wad(10)).unwrap();

        assert!(quote.amount_out >= expand_to_wad(10));
        let cheaper = pool.quote_base_out(quote.amount_in - U256::one()).unwrap();
        assert!(cheaper.amount_out < expand_to_wad(10));

        assert!(matches!(
            pool.quote_quote_in(expand_to_wad(2_000)),
            Err(CurveError::InsufficientLiquidity { .. })
        ));
    }

    #[test]
    fn test_exact_base_out_checks_delivered_amount() {
        let mut pool = ReservePool::new(params(0)).unwrap();
        pool.deposit(U256::one(), U256::zero()).unwrap();

        // One quote unit is the cheapest way to reach one base unit,
        // and it moves the curve to isqrt(2e18)
        assert_eq!(
            pool.quote_quote_in(U256::one()),
            Err(CurveError::insufficient_liquidity(
                U256::from(1_414_213_562u64),
                U256::one()
            ))
        );

        pool.deposit(U256::from(1_414_213_561u64), U256::zero()).unwrap();
        let quote = pool.quote_quote_in(U256::one()).unwrap();
        assert_eq!(quote.amount_in, U256::one());
        assert_eq!(quote.amount_out, U256::from(1_414_213_562u64));
    }

    #[test]
    fn test_reserve_overflow_is_invalid_amount() {
        let mut pool = ReservePool::new(params(0)).unwrap();
        pool.deposit(U256::MAX - U256::from(5u64), U256::zero()).unwrap();
        let before = *pool.state();

        assert!(matches!(
            pool.deposit(U256::from(10u64), U256::zero()),
            Err(CurveError::InvalidAmount { .. })
        ));
        assert_eq!(*pool.state(), before);

        let state = ReserveState {
            base_reserve: expand_to_wad(1_000),
            quote_reserve: U256::MAX - U256::from(5u64),
            supply: U256::zero(),
        };
        let mut pool = ReservePool::from_state(params(0), PoolMode::Reserve, state).unwrap();
        assert!(matches!(
            pool.swap_quote_for_base(U256::from(10u64)),
            Err(CurveError::InvalidAmount { .. })
        ));
        assert!(matches!(
            pool.deposit(U256::zero(), U256::from(10u64)),
            Err(CurveError::InvalidAmount { .. })
        ));
        assert_eq!(*pool.state(), state);
    }

    #[test]
    fn test_continuous_mint_mode() {
        let cap = expand_to_wad(12);
        let mut pool = ReservePool::continuous(params(0), Some(cap)).unwrap();

        assert!(matches!(
            pool.deposit(expand_to_wad(1), U256::zero()),
            Err(CurveError::InvalidAmount { .. })
        ));

        // Base is minted, not drawn from a reserve
        let minted = pool.swap_quote_for_base(expand_to_wad(50)).unwrap();
        assert_eq!(minted, expand_to_wad(10));
        assert_eq!(pool.state().base_reserve, U256::zero());

        // 30 more quote would carry supply to ~12.65, past the cap
        let result = pool.swap_quote_for_base(expand_to_wad(30));
        assert_eq!(
            result,
            Err(CurveError::insufficient_liquidity(
                parse_units("2.649110640673517327").unwrap(),
                expand_to_wad(2)
            ))
        );

        // Selling burns base and returns quote along the curve
        let quote_out = pool.swap_base_for_quote(expand_to_wad(10)).unwrap();
        assert_eq!(quote_out, expand_to_wad(50));
        assert!(pool.state().supply.is_zero());
        assert!(pool.state().quote_reserve.is_zero());
    }

    #[test]
    fn test_from_state_validates_invariant() {
        let state = ReserveState {
            base_reserve: expand_to_wad(990),
            quote_reserve: expand_to_wad(50),
            supply: expand_to_wad(10),
        };
        let pool = ReservePool::from_state(params(0), PoolMode::Reserve, state).unwrap();
        assert_eq!(pool.price_base().unwrap(), expand_to_wad(10));

        let corrupt = ReserveState {
            quote_reserve: expand_to_wad(49),
            ..state
        };
        assert!(matches!(
            ReservePool::from_state(params(0), PoolMode::Reserve, corrupt),
            Err(CurveError::InvalidParameter { .. })
        ));

        let capped = PoolMode::ContinuousMint {
            supply_cap: Some(expand_to_wad(5)),
        };
        assert!(ReservePool::from_state(params(0), capped, state).is_err());
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let mut pool = seeded_pool(0);
        pool.swap_quote_for_base(expand_to_wad(50)).unwrap();

        let json = serde_json::to_string(pool.state()).unwrap();
        let restored: ReserveState = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, pool.state());
    }
}
