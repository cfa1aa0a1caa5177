//! Fixed-point arithmetic for curve calculations
//!
//! All token amounts and curve positions are unsigned integers scaled by
//! 10^18 (WAD). Values that can exceed 256 bits, such as `s^(n+1)`, are
//! carried in 512-bit integers and narrowed back with an explicit check.
//!
//! ## Design Principles
//!
//! - **Checked Widths**: every widening multiply and every narrowing is checked
//! - **Exact Powers**: integer exponentiation, a single truncation per formula
//! - **Deterministic Roots**: floor k-th root via integer Newton iteration;
//!   `f64` is only used to pick the starting point
//! - **Display Boundary**: `Decimal` conversions for logging, config and tests

use crate::error::CurveError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use uint::construct_uint;

construct_uint! {
    /// 256-bit unsigned integer for reserves and curve positions.
    pub struct U256(4);
}

construct_uint! {
    /// 512-bit working width for powers of curve positions.
    pub struct U512(8);
}

/// Decimal places of every token amount handled by the engine
pub const DECIMALS: u32 = 18;

/// Fixed-point scale, 10^18
pub const WAD: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// Newton iteration budget for [`root`]
pub const MAX_ROOT_ITERATIONS: usize = 64;

impl From<U256> for U512 {
    fn from(value: U256) -> Self {
        let mut limbs = [0u64; 8];
        limbs[..4].copy_from_slice(&value.0);
        U512(limbs)
    }
}

/// Narrow a 512-bit intermediate back to 256 bits
pub fn narrow(value: U512, operation: &'static str) -> Result<U256, CurveError> {
    if value.0[4..].iter().any(|&limb| limb != 0) {
        return Err(CurveError::overflow(operation));
    }
    let mut limbs = [0u64; 4];
    limbs.copy_from_slice(&value.0[..4]);
    Ok(U256(limbs))
}

/// Whole tokens expressed at 18 decimals (`whole * 10^18`)
pub fn expand_to_wad(whole: u64) -> U256 {
    U256::from(whole) * WAD
}

/// `floor(a * b / c)` with a 512-bit intermediate product
pub fn mul_div(a: U256, b: U256, c: U256) -> Result<U256, CurveError> {
    if c.is_zero() {
        return Err(CurveError::invalid_parameter("mul_div by zero"));
    }
    let product = U512::from(a) * U512::from(b);
    narrow(product / U512::from(c), "mul_div")
}

/// `ceil(a / b)` on 512-bit values
pub fn div_ceil(a: U512, b: U512) -> Result<U512, CurveError> {
    if b.is_zero() {
        return Err(CurveError::invalid_parameter("div_ceil by zero"));
    }
    let quotient = a / b;
    if (a % b).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U512::one())
    }
}

/// Exact integer exponentiation by repeated squaring
///
/// Fails with `Overflow` when `base^exponent` does not fit in 512 bits.
pub fn power(base: U512, exponent: u32) -> Result<U512, CurveError> {
    checked_power(base, exponent).ok_or(CurveError::overflow("power"))
}

fn checked_power(mut base: U512, mut exponent: u32) -> Option<U512> {
    let mut acc = U512::one();
    while exponent > 0 {
        if exponent & 1 == 1 {
            acc = acc.checked_mul(base)?;
        }
        exponent >>= 1;
        if exponent > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(acc)
}

/// WAD-scaled `x^n`: `x^n / WAD^(n-1)`, truncated once
pub fn pow_wad(x: U256, n: u32) -> Result<U256, CurveError> {
    if n == 0 {
        return Ok(WAD);
    }
    let numerator = power(U512::from(x), n)?;
    let scale = power(U512::from(WAD), n - 1)?;
    narrow(numerator / scale, "pow_wad")
}

/// Floor `k`-th root of `target`
///
/// Newton's method on integers: starting from any value above the true root,
/// `x' = ((k-1)·x + target / x^(k-1)) / k` decreases monotonically and stops
/// at `floor(target^(1/k))` the first time it fails to decrease. The start is
/// a float estimate nudged upward.
pub fn root(target: U512, k: u32) -> Result<U512, CurveError> {
    if k == 0 {
        return Err(CurveError::invalid_parameter("root of degree zero"));
    }
    if target.is_zero() || k == 1 {
        return Ok(target);
    }

    let degree = U512::from(k);
    let degree_minus_one = U512::from(k - 1);
    let mut x = seed_root(target, k);
    let mut iterations = 0;

    // Newton from below never terminates correctly; push the seed above the root
    while !exceeds_root(x, k, target) {
        if iterations == MAX_ROOT_ITERATIONS {
            return Err(CurveError::ConvergenceError {
                degree: k,
                iterations,
            });
        }
        x = x
            .checked_mul(U512::from(2u64))
            .and_then(|doubled| doubled.checked_add(U512::one()))
            .ok_or(CurveError::overflow("root seed"))?;
        iterations += 1;
    }

    while iterations < MAX_ROOT_ITERATIONS {
        let quotient = match checked_power(x, k - 1) {
            Some(divisor) => target / divisor,
            None => U512::zero(),
        };
        let next = x
            .checked_mul(degree_minus_one)
            .and_then(|scaled| scaled.checked_add(quotient))
            .ok_or(CurveError::overflow("root"))?
            / degree;

        if next >= x {
            return Ok(x);
        }
        x = next;
        iterations += 1;
    }

    Err(CurveError::ConvergenceError {
        degree: k,
        iterations,
    })
}

/// True when `x^k > target`, treating a 512-bit overflow as "above"
fn exceeds_root(x: U512, k: u32, target: U512) -> bool {
    match checked_power(x, k) {
        Some(value) => value > target,
        None => true,
    }
}

fn seed_root(target: U512, k: u32) -> U512 {
    let estimate = u512_to_f64(target).powf(1.0 / k as f64);
    let seed = f64_to_u512(estimate);
    // f64 carries ~2^-52 relative error; 2^-16 headroom keeps us above the root
    seed + (seed >> 16usize) + U512::one()
}

fn u512_to_f64(value: U512) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}

fn f64_to_u512(value: f64) -> U512 {
    if !value.is_finite() || value < 1.0 {
        return U512::zero();
    }
    if value < 9.0e18 {
        return U512::from(value as u64);
    }
    let exponent = value.log2().floor() as i32;
    let shift = exponent - 52;
    let mantissa = (value / 2f64.powi(shift)) as u64;
    U512::from(mantissa) << (shift as usize)
}

/// Convert a WAD-scaled amount to `Decimal` (for display and logging)
pub fn to_decimal(value: U256) -> Result<Decimal, CurveError> {
    let whole = value / WAD;
    let fraction = value % WAD;
    if whole.bits() > 96 {
        return Err(CurveError::overflow("to_decimal"));
    }
    let whole = Decimal::from_i128_with_scale(whole.low_u128() as i128, 0);
    let fraction = Decimal::from_i128_with_scale(fraction.low_u128() as i128, DECIMALS);
    whole
        .checked_add(fraction)
        .map(|d| d.normalize())
        .ok_or(CurveError::overflow("to_decimal"))
}

/// Convert a non-negative `Decimal` to a WAD-scaled amount
///
/// Digits beyond 18 decimal places are truncated.
pub fn from_decimal(value: Decimal) -> Result<U256, CurveError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CurveError::invalid_amount(format!(
            "negative amount {}",
            value
        )));
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale();
    if scale <= DECIMALS {
        mantissa
            .checked_mul(U256::exp10((DECIMALS - scale) as usize))
            .ok_or(CurveError::overflow("from_decimal"))
    } else {
        Ok(mantissa / U256::exp10((scale - DECIMALS) as usize))
    }
}

/// Parse a human-readable token amount ("50", "9.81") into WAD units
pub fn parse_units(input: &str) -> Result<U256, CurveError> {
    let decimal = Decimal::from_str(input.trim())
        .map_err(|_| CurveError::invalid_amount(format!("invalid decimal amount '{}'", input)))?;
    from_decimal(decimal)
}

impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        U256::from_dec_str(&text).map_err(|e| {
            serde::de::Error::custom(format!("invalid U256 '{}': {:?}", text, e))
        })
    }
}
