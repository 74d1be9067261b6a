//! Fee split of a fill's gross destination amount.
//!
//! ```text
//! integrator = floor(gross * integrator_rate / FEE_BASE)
//! protocol   = floor(gross * protocol_rate   / FEE_BASE)
//!            + floor(max(0, gross - estimate) * surplus_pct / 100)
//! maker      = gross - integrator - protocol
//! ```
//!
//! Surplus is measured on the gross amount, the same basis the estimate is
//! quoted in. Comparing the post-fee amount against the pre-fee estimate
//! would hide the surplus whenever the base fees exceed the gap.

use escrowswap_types::constants::{FEE_BASE, SURPLUS_BASE};
use escrowswap_types::{EscrowSwapError, Result};

use crate::rounding::{Rounding, mul_div};

/// How a gross destination amount is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    /// Base protocol fee plus the surplus share.
    pub protocol_fee: u64,
    pub integrator_fee: u64,
    /// Surplus share alone (included in `protocol_fee`).
    pub surplus_fee: u64,
    /// Net amount for the maker's receiver.
    pub maker_amount: u64,
}

impl FeeSplit {
    #[must_use]
    pub fn total_fees(&self) -> u64 {
        self.protocol_fee + self.integrator_fee
    }
}

/// Split `gross_dst` into fees and the maker's net amount.
///
/// # Errors
/// - `ArithmeticUnderflow` if the fees exceed `gross_dst`
/// - `ArithmeticOverflow` if a fee sum overflows
pub fn split(
    gross_dst: u64,
    protocol_fee_rate: u16,
    integrator_fee_rate: u16,
    surplus_percentage: u8,
    estimated_gross_dst: u64,
) -> Result<FeeSplit> {
    let integrator_fee = mul_div(
        gross_dst,
        u64::from(integrator_fee_rate),
        FEE_BASE,
        Rounding::Down,
        "integrator fee",
    )?;
    let base_protocol_fee = mul_div(
        gross_dst,
        u64::from(protocol_fee_rate),
        FEE_BASE,
        Rounding::Down,
        "protocol fee",
    )?;

    let surplus = gross_dst.saturating_sub(estimated_gross_dst);
    let surplus_fee = mul_div(
        surplus,
        u64::from(surplus_percentage),
        SURPLUS_BASE,
        Rounding::Down,
        "surplus fee",
    )?;

    let protocol_fee = base_protocol_fee
        .checked_add(surplus_fee)
        .ok_or(EscrowSwapError::ArithmeticOverflow {
            context: "protocol fee",
        })?;

    let maker_amount = gross_dst
        .checked_sub(integrator_fee)
        .and_then(|rest| rest.checked_sub(protocol_fee))
        .ok_or(EscrowSwapError::ArithmeticUnderflow {
            context: "maker amount",
        })?;

    Ok(FeeSplit {
        protocol_fee,
        integrator_fee,
        surplus_fee,
        maker_amount,
    })
}
