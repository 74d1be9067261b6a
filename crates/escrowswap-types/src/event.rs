//! Settlement events and operation receipts.
//!
//! Every state change appends a [`SettlementEvent`] to the engine's log,
//! forming an append-only audit trail that indexers can replay. Fill and
//! cancel operations additionally return a receipt to the caller.

use serde::{Deserialize, Serialize};

use crate::{Address, AssetKind, OrderHash};

/// A state change of an escrow record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementEvent {
    /// A maker opened an escrow and deposited the source amount.
    EscrowCreated {
        order_hash: OrderHash,
        escrow: Address,
        maker: Address,
        src_asset: AssetKind,
        src_amount: u64,
        expiration_time: u32,
    },
    /// A resolver filled part or all of the escrow.
    EscrowFilled {
        order_hash: OrderHash,
        escrow: Address,
        taker: Address,
        src_filled: u64,
        dst_amount: u64,
        protocol_fee: u64,
        integrator_fee: u64,
        maker_amount: u64,
        remaining: u64,
    },
    /// The escrow balance reached zero and the record was destroyed.
    EscrowClosed {
        order_hash: OrderHash,
        escrow: Address,
        rent_refunded: u64,
    },
    /// The maker cancelled and took back the residual balance.
    EscrowCancelled {
        order_hash: OrderHash,
        escrow: Address,
        maker: Address,
        returned: u64,
    },
    /// A resolver closed an expired escrow and collected a premium.
    EscrowCancelledByResolver {
        order_hash: OrderHash,
        escrow: Address,
        resolver: Address,
        returned: u64,
        resolver_reward: u64,
        maker_lamports: u64,
    },
}

impl SettlementEvent {
    #[must_use]
    pub fn order_hash(&self) -> OrderHash {
        match self {
            Self::EscrowCreated { order_hash, .. }
            | Self::EscrowFilled { order_hash, .. }
            | Self::EscrowClosed { order_hash, .. }
            | Self::EscrowCancelled { order_hash, .. }
            | Self::EscrowCancelledByResolver { order_hash, .. } => *order_hash,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EscrowCreated { .. } => "ESCROW_CREATED",
            Self::EscrowFilled { .. } => "ESCROW_FILLED",
            Self::EscrowClosed { .. } => "ESCROW_CLOSED",
            Self::EscrowCancelled { .. } => "ESCROW_CANCELLED",
            Self::EscrowCancelledByResolver { .. } => "ESCROW_CANCELLED_BY_RESOLVER",
        }
    }
}

impl std::fmt::Display for SettlementEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Result of a successful fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReceipt {
    pub order_hash: OrderHash,
    pub escrow: Address,
    /// Source amount moved to the taker.
    pub src_filled: u64,
    /// Rate bump in effect at execution, units of 1/`RATE_BUMP_BASE`.
    pub rate_bump: u64,
    /// Gross destination amount paid by the taker.
    pub dst_amount: u64,
    /// Protocol fee including the surplus share.
    pub protocol_fee: u64,
    /// Surplus share alone (already counted in `protocol_fee`).
    pub surplus_fee: u64,
    pub integrator_fee: u64,
    /// Destination amount delivered to the maker's receiver.
    pub maker_amount: u64,
    /// Escrow balance after the fill.
    pub remaining: u64,
    /// Whether this fill closed the escrow.
    pub closed: bool,
}

/// Result of a successful cancellation (either path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReceipt {
    pub order_hash: OrderHash,
    pub escrow: Address,
    /// Residual source balance returned to the maker.
    pub returned: u64,
    /// Premium paid to the resolver (zero on the maker path).
    pub resolver_reward: u64,
    /// Lamports released to the maker from the record's backing.
    pub maker_lamports: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_event() -> SettlementEvent {
        SettlementEvent::EscrowClosed {
            order_hash: OrderHash([1; 32]),
            escrow: Address([2; 32]),
            rent_refunded: 10,
        }
    }

    #[test]
    fn event_display() {
        assert_eq!(format!("{}", closed_event()), "ESCROW_CLOSED");
    }

    #[test]
    fn event_order_hash_accessor() {
        assert_eq!(closed_event().order_hash(), OrderHash([1; 32]));
    }

    #[test]
    fn event_serde_is_tagged() {
        let json = serde_json::to_string(&closed_event()).unwrap();
        assert!(json.contains("\"type\":\"ESCROW_CLOSED\""), "Got: {json}");
        let back: SettlementEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, closed_event());
    }
}
