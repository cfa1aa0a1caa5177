//! Error types for curve arithmetic and pool state transitions
//!
//! Every variant is raised before a pool commits any change, so a returned
//! error always means the reserves are exactly as they were before the call.

use crate::fixed_point::U256;
use thiserror::Error;

/// Errors produced by curve math, fee handling and pool transitions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Curve parameters or fee outside their valid range
    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// Trade amount is zero, or a sell exceeds the current curve supply
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Computed output exceeds what the pool holds
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: U256, available: U256 },

    /// Intermediate value does not fit the working width
    #[error("Overflow in {operation}")]
    Overflow { operation: &'static str },

    /// Root solver ran out of iterations; indicates a parameter or overflow bug
    #[error("Root solver failed to converge for degree {degree} after {iterations} iterations")]
    ConvergenceError { degree: u32, iterations: usize },

    /// Output fell below the caller's minimum
    #[error("Slippage exceeded: minimum output {minimum}, computed {actual}")]
    SlippageExceeded { minimum: U256, actual: U256 },
}

impl CurveError {
    pub fn invalid_parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            reason: reason.into(),
        }
    }

    pub fn insufficient_liquidity(requested: U256, available: U256) -> Self {
        Self::InsufficientLiquidity {
            requested,
            available,
        }
    }

    pub fn overflow(operation: &'static str) -> Self {
        Self::Overflow { operation }
    }
}
