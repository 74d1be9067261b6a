//! Source → destination amount conversions.
//!
//! What the taker owes is always rounded up: no sequence of partial fills
//! can deliver less than the maker's pro-rata minimum.

use escrowswap_types::constants::RATE_BUMP_BASE;
use escrowswap_types::{EscrowSwapError, Result};

use crate::rounding::{Rounding, mul_div};

/// Destination amount owed for filling `fill_src_amount` of an order.
///
/// `ceil(ceil(min_dst * fill / original) * (BASE + bump) / BASE)`: first
/// the pro-rata share of the minimum, then the Dutch-auction bump. Both
/// steps round up, so the result is never below the exact value.
pub fn dst_amount_owed(
    min_dst_amount: u64,
    original_src_amount: u64,
    fill_src_amount: u64,
    rate_bump: u64,
) -> Result<u64> {
    let pro_rata = mul_div(
        min_dst_amount,
        fill_src_amount,
        original_src_amount,
        Rounding::Up,
        "pro-rata destination amount",
    )?;
    let bumped_base = RATE_BUMP_BASE
        .checked_add(rate_bump)
        .ok_or(EscrowSwapError::ArithmeticOverflow {
            context: "rate bump",
        })?;
    mul_div(
        pro_rata,
        bumped_base,
        RATE_BUMP_BASE,
        Rounding::Up,
        "rate-bumped destination amount",
    )
}

/// The order's estimated destination amount scaled to this fill.
///
/// Rounded up: a higher threshold can only shrink the surplus fee, never
/// inflate it.
pub fn scaled_estimate(
    estimated_dst_amount: u64,
    original_src_amount: u64,
    fill_src_amount: u64,
) -> Result<u64> {
    mul_div(
        estimated_dst_amount,
        fill_src_amount,
        original_src_amount,
        Rounding::Up,
        "scaled estimate",
    )
}
