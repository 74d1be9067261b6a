//! # escrowswap-pricing
//!
//! **Pure pricing functions for EscrowSwap.**
//!
//! Everything here is a function of its arguments and the supplied
//! timestamp only:
//!
//! - **Zero side effects**: no ledger access, no authorization, no clock
//! - **Integer-only**: no floating point; every ratio goes through
//!   [`mul_div`] with an explicit [`Rounding`] direction
//! - **Checked**: overflow and underflow surface as arithmetic errors
//!
//! Rounding policy: amounts a taker owes round **up**, fees round **down**.

pub mod amounts;
pub mod auction;
pub mod fees;
pub mod rounding;

pub use amounts::{dst_amount_owed, scaled_estimate};
pub use auction::{cancellation_premium, rate_bump};
pub use fees::{FeeSplit, split};
pub use rounding::{Rounding, mul_div};
