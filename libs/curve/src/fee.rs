//! Proportional trade fee
//!
//! The curve only ever sees the fee-reduced amount: the fee comes off the
//! input of a quote→base swap and off the output of a base→quote swap.

use crate::error::CurveError;
use crate::fixed_point::{mul_div, U256};
use crate::params::FEE_DENOMINATOR;

/// Fee expressed in thousandths of the traded amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    fee_thousandths: u16,
}

impl FeePolicy {
    pub fn new(fee_thousandths: u16) -> Result<Self, CurveError> {
        if fee_thousandths > FEE_DENOMINATOR {
            return Err(CurveError::invalid_parameter(format!(
                "fee {} exceeds {} thousandths",
                fee_thousandths, FEE_DENOMINATOR
            )));
        }
        Ok(Self { fee_thousandths })
    }

    pub fn fee_thousandths(&self) -> u16 {
        self.fee_thousandths
    }

    /// Fee charged on `amount`, rounded down
    pub fn fee_on(&self, amount: U256) -> Result<U256, CurveError> {
        mul_div(
            amount,
            U256::from(self.fee_thousandths),
            U256::from(FEE_DENOMINATOR),
        )
    }

    /// `amount - floor(amount · fee / 1000)`
    pub fn apply(&self, amount: U256) -> Result<U256, CurveError> {
        Ok(amount - self.fee_on(amount)?)
    }

    /// Smallest gross amount whose fee-adjusted value reaches `effective`
    pub fn gross_for(&self, effective: U256) -> Result<U256, CurveError> {
        if effective.is_zero() {
            return Ok(U256::zero());
        }
        if self.fee_thousandths == FEE_DENOMINATOR {
            return Err(CurveError::invalid_amount(
                "a 100% fee leaves nothing to reach the requested amount",
            ));
        }

        // apply() is non-decreasing; search [effective, ceil(effective·1000/(1000-fee))]
        let keep = U256::from(FEE_DENOMINATOR - self.fee_thousandths);
        let denominator = U256::from(FEE_DENOMINATOR);
        let mut high = mul_div(effective, denominator, keep)?;
        if self.apply(high)? < effective {
            high += U256::one();
        }
        let mut low = effective;
        while low < high {
            let mid = low + (high - low) / U256::from(2u64);
            if self.apply(mid)? >= effective {
                high = mid;
            } else {
                low = mid + U256::one();
            }
        }
        Ok(low)
    }
}

/// Fee-adjusted effective amount for a fee in thousandths
pub fn apply_fee(amount: U256, fee_thousandths: u16) -> Result<U256, CurveError> {
    FeePolicy::new(fee_thousandths)?.apply(amount)
}
