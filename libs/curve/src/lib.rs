//! # Bonding Curve Engine - Exact Power-Law Pricing and Reserve Accounting
//!
//! ## Purpose
//!
//! Pricing and reserve accounting for power-law bonding curves,
//! `price(s) = m · s^n`. Buyers pay quote tokens to move the curve position
//! forward and receive base tokens; sellers move it back and are paid out of
//! the quote reserve. All amounts are 18-decimal fixed-point integers and
//! every formula rounds in the pool's favour.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Deposit, withdraw and swap requests from a settlement layer
//!   that already moved (or will move) the tokens
//! - **Output Destinations**: Amounts to transfer out, quotes for routers and UIs
//! - **Persistence**: [`ReserveState`] is serde-serializable; [`ReservePool::from_state`]
//!   restores a pool and re-checks the reserve invariant
//! - **Configuration**: Parameters and modes come from the `curve-config` crate
//!
//! ## Architecture Role
//!
//! ```text
//! fixed_point ──► curve_math ──┐
//!                 fee ─────────┼──► pool (CurveEngine) ──► ReservePool
//!                 params ──────┘           │
//!                                          └──────────► quote (ExternalReserves)
//!                                 pool_traits::CurvePool unifies both
//! ```
//!
//! Live pools and reserve snapshots share one transition planner, so a quote
//! and the swap that executes it produce the same amounts.
//!
//! ## Numerical Profile
//!
//! - **Working width**: 512-bit intermediates, 256-bit amounts
//! - **Roots**: integer Newton iteration, float-seeded, at most
//!   [`MAX_ROOT_ITERATIONS`] steps
//! - **Reserve invariant**: `quote_reserve ≥ integral(s)`; the excess is fee
//!   revenue plus rounding dust
//! - **No floating point** in any committed amount

pub mod curve_math;
pub mod error;
pub mod fee;
pub mod fixed_point;
pub mod params;
pub mod pool;
pub mod pool_traits;
pub mod quote;

pub use curve_math::CurveModel;
pub use error::CurveError;
pub use fee::{apply_fee, FeePolicy};
pub use fixed_point::{
    expand_to_wad, from_decimal, mul_div, parse_units, pow_wad, power, root, to_decimal, U256,
    U512, DECIMALS, MAX_ROOT_ITERATIONS, WAD,
};
pub use params::{CurveParameters, PoolMode, FEE_DENOMINATOR, MAX_EXPONENT, SLOPE_DENOMINATOR};
pub use pool::{DepositOutcome, ReservePool, ReserveState, Withdrawal};
pub use pool_traits::CurvePool;
pub use quote::{ExternalReserves, Reserves, TradeQuote};

/// Common types for curve calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
