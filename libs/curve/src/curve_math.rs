//! Power-law bonding curve mathematics
//!
//! `price(s) = m · s^n` and its antiderivative `F(s) = m · s^(n+1) / (n+1)`,
//! evaluated on WAD-scaled integers. With `k = n + 1` and the integral scale
//! `D = m_den · k · WAD^n`:
//!
//! - `price(s)    = m_num · s^n / (m_den · WAD^(n-1))`
//! - `integral(s) = m_num · s^k / D`
//! - `inverse(q)  = floor_root_k(q · D / m_num)`
//!
//! Each formula truncates exactly once, after the full-width product.

use crate::error::CurveError;
use crate::fixed_point::{div_ceil, narrow, power, root, U256, U512, WAD};
use crate::params::CurveParameters;

/// Curve evaluator for one parameter set
///
/// Construction validates the parameters and precomputes both divisors, so the
/// evaluation methods only fail on amounts too large for the working width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveModel {
    params: CurveParameters,
    price_divisor: U512,    // m_den · WAD^(n-1)
    integral_divisor: U512, // m_den · (n+1) · WAD^n
}

impl CurveModel {
    pub fn new(params: CurveParameters) -> Result<Self, CurveError> {
        params.validate()?;

        let wad = U512::from(WAD);
        let price_divisor = U512::from(params.slope_denominator)
            .checked_mul(power(wad, params.exponent - 1)?)
            .ok_or(CurveError::overflow("price divisor"))?;
        let integral_divisor = price_divisor
            .checked_mul(wad)
            .and_then(|scaled| scaled.checked_mul(U512::from(params.exponent + 1)))
            .ok_or(CurveError::overflow("integral divisor"))?;

        Ok(Self {
            params,
            price_divisor,
            integral_divisor,
        })
    }

    pub fn params(&self) -> &CurveParameters {
        &self.params
    }

    /// Degree of the integral, `n + 1`
    fn degree(&self) -> u32 {
        self.params.exponent + 1
    }

    fn slope_numerator(&self) -> U512 {
        U512::from(self.params.slope_numerator)
    }

    /// Instantaneous price at curve position `s` (quote per base, WAD scaled)
    pub fn price(&self, s: U256) -> Result<U256, CurveError> {
        let numerator = power(U512::from(s), self.params.exponent)?
            .checked_mul(self.slope_numerator())
            .ok_or(CurveError::overflow("price"))?;
        narrow(numerator / self.price_divisor, "price")
    }

    /// Quote reserve implied by curve position `s`
    pub fn integral(&self, s: U256) -> Result<U256, CurveError> {
        let numerator = power(U512::from(s), self.degree())?
            .checked_mul(self.slope_numerator())
            .ok_or(CurveError::overflow("integral"))?;
        narrow(numerator / self.integral_divisor, "integral")
    }

    /// Largest curve position whose integral does not exceed `quote`
    pub fn inverse_integral(&self, quote: U256) -> Result<U256, CurveError> {
        self.advance(U256::zero(), quote)
    }

    /// Curve position reached by adding `quote_in` at position `s`
    ///
    /// Solves `s'^k = s^k + quote_in · D / m_num`, the same equation as
    /// `inverse_integral(integral(s) + quote_in)` but without truncating
    /// `integral(s)` first, so the result is never below `s`.
    pub fn advance(&self, s: U256, quote_in: U256) -> Result<U256, CurveError> {
        let shift = U512::from(quote_in)
            .checked_mul(self.integral_divisor)
            .ok_or(CurveError::overflow("advance"))?
            / self.slope_numerator();
        let target = power(U512::from(s), self.degree())?
            .checked_add(shift)
            .ok_or(CurveError::overflow("advance"))?;
        narrow(root(target, self.degree())?, "advance")
    }

    /// Smallest quote amount whose [`advance`](Self::advance) from `from`
    /// reaches at least `to`
    ///
    /// `advance(from, q) >= to` holds iff `q · D / m_num >= to^k - from^k`,
    /// so the answer is `ceil((to^k - from^k) · m_num / D)`.
    pub fn quote_to_reach(&self, from: U256, to: U256) -> Result<U256, CurveError> {
        if to <= from {
            return Ok(U256::zero());
        }
        let gap = power(U512::from(to), self.degree())?
            .checked_sub(power(U512::from(from), self.degree())?)
            .ok_or(CurveError::overflow("quote_to_reach"))?;
        let scaled = gap
            .checked_mul(self.slope_numerator())
            .ok_or(CurveError::overflow("quote_to_reach"))?;
        narrow(div_ceil(scaled, self.integral_divisor)?, "quote_to_reach")
    }

    /// Curve position at which the instantaneous price equals `price`
    pub fn supply_for_price(&self, price: U256) -> Result<U256, CurveError> {
        let target = U512::from(price)
            .checked_mul(self.price_divisor)
            .ok_or(CurveError::overflow("supply_for_price"))?
            / self.slope_numerator();
        narrow(root(target, self.params.exponent)?, "supply_for_price")
    }

    /// Quote reserve that seeds an empty pool at starting price `price`
    pub fn reserve_for_start_price(&self, price: U256) -> Result<U256, CurveError> {
        self.integral(self.supply_for_price(price)?)
    }
}
