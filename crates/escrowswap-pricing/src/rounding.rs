//! The one ratio utility every source/destination conversion goes through.
//!
//! Call sites pick the rounding direction explicitly; nothing in the
//! workspace divides amounts any other way.

use escrowswap_types::{EscrowSwapError, Result};

/// Direction of integer rounding for a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero. Used for fees.
    Down,
    /// Away from zero. Used for amounts a taker owes.
    Up,
}

/// `value * numerator / denominator` computed in 128 bits.
///
/// # Errors
/// - `DivisionByZero` if `denominator == 0`
/// - `ArithmeticOverflow` if the result does not fit in `u64`
pub fn mul_div(
    value: u64,
    numerator: u64,
    denominator: u64,
    rounding: Rounding,
    context: &'static str,
) -> Result<u64> {
    if denominator == 0 {
        return Err(EscrowSwapError::DivisionByZero { context });
    }
    let product = u128::from(value) * u128::from(numerator);
    let denominator = u128::from(denominator);
    let mut quotient = product / denominator;
    if rounding == Rounding::Up && product % denominator != 0 {
        quotient += 1;
    }
    u64::try_from(quotient).map_err(|_| EscrowSwapError::ArithmeticOverflow { context })
}
