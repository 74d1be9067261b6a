//! Balance ledger for every party and custody account.
//!
//! Tracks per-(owner, asset) `u64` balances. Escrow custody accounts are
//! ordinary owners here, keyed by their derived address. Every mutation is
//! checked: a debit below zero is `InsufficientFunds`, a credit past
//! `u64::MAX` is `ArithmeticOverflow`, and a failed call leaves the ledger
//! unchanged.

use std::collections::HashMap;

use escrowswap_types::{Address, EscrowSwapError, LedgerAsset, MintId, Result};

use crate::supply_conservation::SupplyConservation;

const WRAPPED_NATIVE: LedgerAsset = LedgerAsset::Token(MintId::NATIVE);

/// Source of truth for all balance state.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<(Address, LedgerAsset), u64>,
    supply: SupplyConservation,
}

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// External inflow (faucet / bridge). Recorded as new supply.
    pub fn deposit(&mut self, owner: Address, asset: LedgerAsset, amount: u64) -> Result<()> {
        self.credit(owner, asset, amount)?;
        self.supply.record_deposit(asset, amount);
        Ok(())
    }

    /// External outflow. Removes supply.
    pub fn withdraw(&mut self, owner: Address, asset: LedgerAsset, amount: u64) -> Result<()> {
        self.debit(owner, asset, amount)?;
        self.supply.record_withdrawal(asset, amount);
        Ok(())
    }

    /// Increase a balance.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would exceed `u64::MAX`.
    pub fn credit(&mut self, owner: Address, asset: LedgerAsset, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let entry = self.balances.entry((owner, asset)).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(EscrowSwapError::ArithmeticOverflow {
                context: "ledger credit",
            })?;
        Ok(())
    }

    /// Decrease a balance. Empty entries are dropped.
    ///
    /// # Errors
    /// Returns `InsufficientFunds` if the balance is below `amount`.
    pub fn debit(&mut self, owner: Address, asset: LedgerAsset, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.balance(&owner, asset);
        if available < amount {
            return Err(EscrowSwapError::InsufficientFunds {
                owner,
                asset: asset.to_string(),
                needed: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(&(owner, asset));
        } else {
            self.balances.insert((owner, asset), remaining);
        }
        Ok(())
    }

    /// Move `amount` of `asset` between two owners.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        asset: LedgerAsset,
        amount: u64,
    ) -> Result<()> {
        if from != to && self.balance(&to, asset).checked_add(amount).is_none() {
            return Err(EscrowSwapError::ArithmeticOverflow {
                context: "ledger transfer",
            });
        }
        self.debit(from, asset, amount)?;
        self.credit(to, asset, amount)
    }

    /// Convert an owner's lamports into wrapped-native tokens.
    pub fn wrap_native(&mut self, owner: Address, amount: u64) -> Result<()> {
        self.debit(owner, LedgerAsset::Lamports, amount)?;
        self.credit(owner, WRAPPED_NATIVE, amount)
    }

    /// Convert an owner's wrapped-native tokens back into lamports.
    pub fn unwrap_native(&mut self, owner: Address, amount: u64) -> Result<()> {
        self.debit(owner, WRAPPED_NATIVE, amount)?;
        self.credit(owner, LedgerAsset::Lamports, amount)
    }

    #[must_use]
    pub fn balance(&self, owner: &Address, asset: LedgerAsset) -> u64 {
        self.balances.get(&(*owner, asset)).copied().unwrap_or(0)
    }

    /// Circulating supply of an asset's economic bucket. For native
    /// supply this counts lamports and wrapped-native tokens together.
    #[must_use]
    pub fn total_supply(&self, asset: LedgerAsset) -> u128 {
        let key = SupplyConservation::supply_key(asset);
        self.balances
            .iter()
            .filter(|((_, held), _)| SupplyConservation::supply_key(*held) == key)
            .map(|(_, amount)| u128::from(*amount))
            .sum()
    }

    /// Check conservation for one asset.
    pub fn verify_supply(&self, asset: LedgerAsset) -> Result<()> {
        self.supply.verify(asset, self.total_supply(asset))
    }

    /// Check conservation for every asset that was ever deposited.
    pub fn verify_all(&self) -> Result<()> {
        for asset in self.supply.tracked_assets() {
            self.verify_supply(asset)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn supply(&self) -> &SupplyConservation {
        &self.supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address([1; 32]);
    const BOB: Address = Address([2; 32]);
    const USDC: LedgerAsset = LedgerAsset::Token(MintId([0x55; 32]));

    #[test]
    fn deposit_and_transfer() {
        let mut ledger = Ledger::new();
        ledger.deposit(ALICE, USDC, 1_000).unwrap();
        ledger.transfer(ALICE, BOB, USDC, 400).unwrap();
        assert_eq!(ledger.balance(&ALICE, USDC), 600);
        assert_eq!(ledger.balance(&BOB, USDC), 400);
        assert_eq!(ledger.total_supply(USDC), 1_000);
        assert!(ledger.verify_supply(USDC).is_ok());
    }

    #[test]
    fn overdraft_is_rejected_without_effect() {
        let mut ledger = Ledger::new();
        ledger.deposit(ALICE, USDC, 100).unwrap();
        let err = ledger.transfer(ALICE, BOB, USDC, 101).unwrap_err();
        assert!(matches!(
            err,
            EscrowSwapError::InsufficientFunds {
                needed: 101,
                available: 100,
                ..
            }
        ));
        assert_eq!(ledger.balance(&ALICE, USDC), 100);
        assert_eq!(ledger.balance(&BOB, USDC), 0);
    }

    #[test]
    fn overflowing_credit_leaves_sender_intact() {
        let mut ledger = Ledger::new();
        ledger.deposit(ALICE, USDC, 10).unwrap();
        ledger.deposit(BOB, USDC, u64::MAX).unwrap();
        let err = ledger.transfer(ALICE, BOB, USDC, 10).unwrap_err();
        assert!(matches!(err, EscrowSwapError::ArithmeticOverflow { .. }));
        assert_eq!(ledger.balance(&ALICE, USDC), 10);
        assert_eq!(ledger.balance(&BOB, USDC), u64::MAX);
    }

    #[test]
    fn zero_transfer_is_noop() {
        let mut ledger = Ledger::new();
        ledger.transfer(ALICE, BOB, USDC, 0).unwrap();
        assert_eq!(ledger.total_supply(USDC), 0);
    }

    #[test]
    fn wrapping_preserves_native_supply() {
        let mut ledger = Ledger::new();
        ledger.deposit(ALICE, LedgerAsset::Lamports, 1_000).unwrap();
        ledger.wrap_native(ALICE, 300).unwrap();
        assert_eq!(ledger.balance(&ALICE, LedgerAsset::Lamports), 700);
        assert_eq!(ledger.balance(&ALICE, WRAPPED_NATIVE), 300);
        assert_eq!(ledger.total_supply(WRAPPED_NATIVE), 1_000);
        ledger.verify_all().unwrap();

        ledger.unwrap_native(ALICE, 300).unwrap();
        assert_eq!(ledger.balance(&ALICE, LedgerAsset::Lamports), 1_000);
        assert!(ledger.unwrap_native(ALICE, 1).is_err());
    }

    #[test]
    fn withdraw_reduces_expected_supply() {
        let mut ledger = Ledger::new();
        ledger.deposit(ALICE, USDC, 500).unwrap();
        ledger.withdraw(ALICE, USDC, 200).unwrap();
        assert_eq!(ledger.supply().expected_supply(USDC), 300);
        ledger.verify_all().unwrap();
    }

    #[test]
    fn tampered_balance_breaks_conservation() {
        let mut ledger = Ledger::new();
        ledger.deposit(ALICE, USDC, 500).unwrap();
        // credit without a matching deposit mints supply out of thin air
        ledger.credit(BOB, USDC, 1).unwrap();
        assert!(matches!(
            ledger.verify_all().unwrap_err(),
            EscrowSwapError::SupplyInvariantViolation { .. }
        ));
    }
}
