//! Order terms: the immutable description of a maker's swap.
//!
//! Every numeric field has a fixed declared width, which the canonical
//! codec carries through unchanged. Once an escrow is created its terms are
//! bound to it through the order hash and can never change.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::constants::{FEE_BASE, SURPLUS_BASE};
use crate::{Address, AssetKind, EscrowSwapError, Result};

/// One decay point of the Dutch auction: reach `rate_bump` after
/// `time_delta` seconds from the previous point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatePoint {
    pub rate_bump: u16,
    pub time_delta: u16,
}

/// Dutch-auction pricing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuctionTerms {
    /// Auction start (unix seconds).
    pub start_time: u32,
    /// Seconds until the rate bump reaches zero.
    pub duration: u32,
    /// Rate bump before and at `start_time`, in units of 1/`RATE_BUMP_BASE`.
    pub initial_rate_bump: u16,
    /// Optional intermediate decay points, in time order.
    pub points: Vec<RatePoint>,
}

impl AuctionTerms {
    /// An auction with no rate bump at all.
    #[must_use]
    pub fn flat(start_time: u32) -> Self {
        Self {
            start_time,
            duration: 0,
            initial_rate_bump: 0,
            points: Vec::new(),
        }
    }

    /// End of the auction as a wide integer (never overflows).
    #[must_use]
    pub fn end_time(&self) -> u64 {
        u64::from(self.start_time) + u64::from(self.duration)
    }

    /// Check the curve is well-formed and non-increasing.
    pub fn validate(&self, max_points: usize) -> Result<()> {
        if self.points.len() > max_points {
            return Err(EscrowSwapError::invalid_terms(format!(
                "{} auction points exceed maximum {max_points}",
                self.points.len()
            )));
        }

        let mut previous = self.initial_rate_bump;
        let mut elapsed: u64 = 0;
        for (i, point) in self.points.iter().enumerate() {
            if point.rate_bump > previous {
                return Err(EscrowSwapError::invalid_terms(format!(
                    "auction point {i} raises the rate bump ({} > {previous})",
                    point.rate_bump
                )));
            }
            previous = point.rate_bump;
            elapsed += u64::from(point.time_delta);
        }

        if elapsed > u64::from(self.duration) {
            return Err(EscrowSwapError::invalid_terms(format!(
                "auction points span {elapsed}s, longer than duration {}s",
                self.duration
            )));
        }
        Ok(())
    }
}

/// Fee parameters of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeTerms {
    /// Protocol fee rate, units of 1/`FEE_BASE`.
    pub protocol_fee: u16,
    /// Integrator fee rate, units of 1/`FEE_BASE`.
    pub integrator_fee: u16,
    /// Share of surplus over the estimate taken by the protocol, percent.
    pub surplus_percentage: u8,
    /// Cap of the cancellation-auction premium, in lamports. Paid out of
    /// the escrow's rent, so the engine rejects a cap above the rent.
    pub max_cancellation_premium: u64,
    /// Receives the protocol and surplus fees.
    pub protocol_dst_account: Option<Address>,
    /// Receives the integrator fee.
    pub integrator_dst_account: Option<Address>,
}

impl FeeTerms {
    /// No fees and no cancellation premium.
    #[must_use]
    pub fn none() -> Self {
        Self {
            protocol_fee: 0,
            integrator_fee: 0,
            surplus_percentage: 0,
            max_cancellation_premium: 0,
            protocol_dst_account: None,
            integrator_dst_account: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let combined = u64::from(self.protocol_fee) + u64::from(self.integrator_fee);
        if combined > FEE_BASE {
            return Err(EscrowSwapError::invalid_terms(format!(
                "combined fee rate {combined} exceeds {FEE_BASE}"
            )));
        }
        if u64::from(self.surplus_percentage) > SURPLUS_BASE {
            return Err(EscrowSwapError::invalid_terms(format!(
                "surplus percentage {} exceeds {SURPLUS_BASE}",
                self.surplus_percentage
            )));
        }
        if (self.protocol_fee > 0 || self.surplus_percentage > 0)
            && self.protocol_dst_account.is_none()
        {
            return Err(EscrowSwapError::MissingAccount {
                account: "protocol_dst_account",
            });
        }
        if self.integrator_fee > 0 && self.integrator_dst_account.is_none() {
            return Err(EscrowSwapError::MissingAccount {
                account: "integrator_dst_account",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn protocol_fee_percent(&self) -> Decimal {
        fee_rate_to_percent(self.protocol_fee)
    }

    #[must_use]
    pub fn integrator_fee_percent(&self) -> Decimal {
        fee_rate_to_percent(self.integrator_fee)
    }
}

/// Convert a human percentage (e.g. `1.5`) to a fee rate in units of
/// 1/`FEE_BASE`. Percentages finer than the base resolution are rejected
/// rather than rounded.
pub fn fee_rate_from_percent(percent: Decimal) -> Result<u16> {
    let units = percent * Decimal::from(FEE_BASE) / Decimal::ONE_HUNDRED;
    if units.is_sign_negative() || !units.fract().is_zero() {
        return Err(EscrowSwapError::invalid_terms(format!(
            "fee {percent}% is not representable in 1/{FEE_BASE} units"
        )));
    }
    units.to_u16().ok_or_else(|| {
        EscrowSwapError::invalid_terms(format!("fee {percent}% exceeds the 16-bit rate field"))
    })
}

/// Inverse of [`fee_rate_from_percent`].
#[must_use]
pub fn fee_rate_to_percent(rate: u16) -> Decimal {
    Decimal::from(rate) * Decimal::ONE_HUNDRED / Decimal::from(FEE_BASE)
}

/// The full, immutable terms of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderTerms {
    /// Maker-chosen id; distinguishes otherwise identical orders.
    pub id: u32,
    pub src_amount: u64,
    pub min_dst_amount: u64,
    /// Expected fill value; only used as the surplus-fee threshold.
    pub estimated_dst_amount: u64,
    /// Unix seconds after which the order cannot be filled.
    pub expiration_time: u32,
    pub src_asset: AssetKind,
    pub dst_asset: AssetKind,
    pub fee: FeeTerms,
    pub auction: AuctionTerms,
    /// Seconds for the cancellation premium to grow from zero to its cap.
    pub cancellation_auction_duration: u32,
}

impl OrderTerms {
    /// Validate the terms for creation at time `now`.
    ///
    /// # Errors
    /// - `InvalidOrderTerms` for malformed amounts, fees or auction curves
    /// - `OrderExpired` if `now` is at or past the expiration
    /// - `MissingAccount` if a nonzero fee has no recipient
    pub fn validate(&self, now: u32, max_auction_points: usize) -> Result<()> {
        if self.src_amount == 0 {
            return Err(EscrowSwapError::invalid_terms("src_amount must be positive"));
        }
        if self.min_dst_amount == 0 {
            return Err(EscrowSwapError::invalid_terms(
                "min_dst_amount must be positive",
            ));
        }
        if self.is_expired(now) {
            return Err(EscrowSwapError::OrderExpired {
                expiration: self.expiration_time,
                now,
            });
        }
        self.fee.validate()?;
        self.auction.validate(max_auction_points)
    }

    /// Whether the order can no longer be filled at `now`.
    #[must_use]
    pub fn is_expired(&self, now: u32) -> bool {
        now >= self.expiration_time
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl OrderTerms {
    /// 1000 → 1000 order without fees or auction, expiring an hour after `now`.
    pub fn dummy(src_asset: AssetKind, dst_asset: AssetKind, now: u32) -> Self {
        Self {
            id: rand::random::<u32>(),
            src_amount: 1000,
            min_dst_amount: 1000,
            estimated_dst_amount: 1000,
            expiration_time: now + 3600,
            src_asset,
            dst_asset,
            fee: FeeTerms::none(),
            auction: AuctionTerms::flat(now),
            cancellation_auction_duration: 0,
        }
    }
}
