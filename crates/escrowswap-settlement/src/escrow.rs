//! Escrow custody records.
//!
//! One record per open order, stored at the address derived from
//! `("escrow", maker, order_hash)`. The record's source balance is the
//! unfilled portion of the order; it only ever decreases, and the record is
//! removed when it closes.

use std::collections::HashMap;

use escrowswap_types::{Address, AssetKind, EscrowSwapError, OrderHash, Result};
use serde::{Deserialize, Serialize};

/// Per-order custody state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Derived address; also the ledger owner of the custody balances.
    pub address: Address,
    pub maker: Address,
    /// Where the maker's destination proceeds are paid.
    pub receiver: Address,
    /// The hash this record is bound to for life.
    pub order_hash: OrderHash,
    pub src_asset: AssetKind,
    pub dst_asset: AssetKind,
    pub original_src_amount: u64,
    /// Unfilled source amount, `0..=original_src_amount`.
    pub balance: u64,
    /// Lamports the maker deposited to back the record.
    pub rent_lamports: u64,
    /// Unix seconds.
    pub created_at: u32,
}

impl EscrowRecord {
    /// Source amount already delivered to takers.
    #[must_use]
    pub fn filled(&self) -> u64 {
        self.original_src_amount - self.balance
    }

    /// Take `amount` out of the unfilled balance.
    ///
    /// # Errors
    /// Returns `InsufficientEscrowBalance` if `amount > balance`.
    pub fn consume(&mut self, amount: u64) -> Result<u64> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(EscrowSwapError::InsufficientEscrowBalance {
                requested: amount,
                available: self.balance,
            })?;
        Ok(self.balance)
    }
}

/// Open escrow records indexed by address.
#[derive(Debug, Clone, Default)]
pub struct EscrowStore {
    records: HashMap<Address, EscrowRecord>,
}

impl EscrowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a record.
    ///
    /// # Errors
    /// Returns `EscrowAlreadyExists` if the address is taken.
    pub fn insert(&mut self, record: EscrowRecord) -> Result<()> {
        if self.records.contains_key(&record.address) {
            return Err(EscrowSwapError::EscrowAlreadyExists(record.address));
        }
        self.records.insert(record.address, record);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&EscrowRecord> {
        self.records.get(address)
    }

    pub fn get_mut(&mut self, address: &Address) -> Result<&mut EscrowRecord> {
        self.records
            .get_mut(address)
            .ok_or(EscrowSwapError::EscrowNotFound(*address))
    }

    /// Close a record.
    pub fn remove(&mut self, address: &Address) -> Result<EscrowRecord> {
        self.records
            .remove(address)
            .ok_or(EscrowSwapError::EscrowNotFound(*address))
    }

    /// Whether any open record is bound to `order_hash`.
    #[must_use]
    pub fn has_order(&self, order_hash: &OrderHash) -> bool {
        self.records.values().any(|r| r.order_hash == *order_hash)
    }

    /// Open records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &EscrowRecord> {
        self.records.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: u8, balance: u64) -> EscrowRecord {
        EscrowRecord {
            address: Address([address; 32]),
            maker: Address([1; 32]),
            receiver: Address([1; 32]),
            order_hash: OrderHash([address; 32]),
            src_asset: AssetKind::Native,
            dst_asset: AssetKind::Native,
            original_src_amount: 1_000,
            balance,
            rent_lamports: 10,
            created_at: 0,
        }
    }

    #[test]
    fn consume_decrements_and_guards() {
        let mut rec = record(9, 1_000);
        assert_eq!(rec.consume(600).unwrap(), 400);
        assert_eq!(rec.filled(), 600);
        let err = rec.consume(401).unwrap_err();
        assert!(matches!(
            err,
            EscrowSwapError::InsufficientEscrowBalance {
                requested: 401,
                available: 400
            }
        ));
        assert_eq!(rec.balance, 400);
        assert_eq!(rec.consume(400).unwrap(), 0);
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut store = EscrowStore::new();
        store.insert(record(9, 1_000)).unwrap();
        assert!(matches!(
            store.insert(record(9, 500)).unwrap_err(),
            EscrowSwapError::EscrowAlreadyExists(_)
        ));
        assert_eq!(store.get(&Address([9; 32])).unwrap().balance, 1_000);

        store.insert(record(7, 300)).unwrap();
        let open: u64 = store.iter().map(|r| r.balance).sum();
        assert_eq!(open, 1_300);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_closes() {
        let mut store = EscrowStore::new();
        store.insert(record(9, 1_000)).unwrap();
        assert!(store.has_order(&OrderHash([9; 32])));
        store.remove(&Address([9; 32])).unwrap();
        assert!(store.is_empty());
        assert!(!store.has_order(&OrderHash([9; 32])));
        assert!(matches!(
            store.remove(&Address([9; 32])).unwrap_err(),
            EscrowSwapError::EscrowNotFound(_)
        ));
    }
}
