//! Supply conservation invariant checker.
//!
//! Invariant enforced before every commit:
//! ```text
//! ∀ asset: Σ balances == Σ deposits - Σ withdrawals
//! ```
//!
//! Raw lamports and wrapped-native tokens are one economic supply: wrapping
//! moves value between the two representations without creating any.
//! Sums are carried in `u128` so that many `u64` balances cannot overflow.

use std::collections::{BTreeSet, HashMap};

use escrowswap_types::{EscrowSwapError, LedgerAsset, Result};

/// Tracks per-asset external inflows and outflows.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total deposits per supply bucket since genesis.
    deposits: HashMap<LedgerAsset, u128>,
    /// Total withdrawals per supply bucket since genesis.
    withdrawals: HashMap<LedgerAsset, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket an asset's supply is accounted in.
    #[must_use]
    pub fn supply_key(asset: LedgerAsset) -> LedgerAsset {
        if asset.is_native_supply() {
            LedgerAsset::Lamports
        } else {
            asset
        }
    }

    pub fn record_deposit(&mut self, asset: LedgerAsset, amount: u64) {
        *self.deposits.entry(Self::supply_key(asset)).or_insert(0) += u128::from(amount);
    }

    pub fn record_withdrawal(&mut self, asset: LedgerAsset, amount: u64) {
        *self
            .withdrawals
            .entry(Self::supply_key(asset))
            .or_insert(0) += u128::from(amount);
    }

    /// Expected total supply: deposits - withdrawals.
    #[must_use]
    pub fn expected_supply(&self, asset: LedgerAsset) -> u128 {
        // withdrawals are debited from real balances, so never exceed deposits
        self.total_deposits(asset)
            .saturating_sub(self.total_withdrawals(asset))
    }

    /// Check the actual circulating supply against the expected one.
    ///
    /// # Errors
    /// Returns [`EscrowSwapError::SupplyInvariantViolation`] if they differ.
    pub fn verify(&self, asset: LedgerAsset, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(asset);
        if actual_supply != expected {
            return Err(EscrowSwapError::SupplyInvariantViolation {
                reason: format!(
                    "{}: actual supply {actual_supply} != expected {expected} \
                     (deposits={}, withdrawals={})",
                    Self::supply_key(asset),
                    self.total_deposits(asset),
                    self.total_withdrawals(asset),
                ),
            });
        }
        Ok(())
    }

    /// Every supply bucket that has seen an inflow or outflow.
    #[must_use]
    pub fn tracked_assets(&self) -> Vec<LedgerAsset> {
        let assets: BTreeSet<LedgerAsset> = self
            .deposits
            .keys()
            .chain(self.withdrawals.keys())
            .copied()
            .collect();
        assets.into_iter().collect()
    }

    #[must_use]
    pub fn total_deposits(&self, asset: LedgerAsset) -> u128 {
        self.deposits
            .get(&Self::supply_key(asset))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total_withdrawals(&self, asset: LedgerAsset) -> u128 {
        self.withdrawals
            .get(&Self::supply_key(asset))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use escrowswap_types::MintId;

    use super::*;

    const USDC: LedgerAsset = LedgerAsset::Token(MintId([0x55; 32]));
    const WRAPPED: LedgerAsset = LedgerAsset::Token(MintId::NATIVE);

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.expected_supply(USDC), 0);
        assert!(sc.verify(USDC, 0).is_ok());
        assert!(sc.tracked_assets().is_empty());
    }

    #[test]
    fn deposits_and_withdrawals() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(USDC, 1_000);
        sc.record_deposit(USDC, 500);
        sc.record_withdrawal(USDC, 300);
        assert_eq!(sc.expected_supply(USDC), 1_200);
        assert!(sc.verify(USDC, 1_200).is_ok());
    }

    #[test]
    fn verify_fails_when_imbalanced() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(USDC, 10);
        let err = sc.verify(USDC, 11).unwrap_err();
        assert!(matches!(
            err,
            EscrowSwapError::SupplyInvariantViolation { .. }
        ));
    }

    #[test]
    fn wrapped_native_shares_the_lamport_bucket() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(LedgerAsset::Lamports, 100);
        sc.record_deposit(WRAPPED, 50);
        assert_eq!(sc.expected_supply(LedgerAsset::Lamports), 150);
        assert_eq!(sc.expected_supply(WRAPPED), 150);
        assert_eq!(sc.tracked_assets(), vec![LedgerAsset::Lamports]);
    }

    #[test]
    fn totals_do_not_overflow_u64() {
        let mut sc = SupplyConservation::new();
        sc.record_deposit(USDC, u64::MAX);
        sc.record_deposit(USDC, u64::MAX);
        assert_eq!(sc.expected_supply(USDC), 2 * u128::from(u64::MAX));
    }
}
