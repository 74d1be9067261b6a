//! # escrowswap-settlement
//!
//! The settlement engine: escrow custody and the four order operations.
//!
//! ## Architecture
//!
//! [`SettlementEngine`] owns a [`Ledger`] of per-(owner, asset) balances and
//! an [`EscrowStore`] of open custody records, and reads resolver
//! authorization through a borrowed [`ResolverGate`]:
//!
//! 1. `create`: the maker deposits the source amount (and the record's
//!    rent) into the escrow derived from `(maker, order hash)`
//! 2. `fill`: an authorized resolver takes source at the Dutch-auction
//!    rate and pays the maker's receiver and the fee accounts
//! 3. `cancel`: the maker reclaims everything, at any time, without fee
//! 4. `cancel_by_resolver`: after expiry, a resolver closes the escrow for
//!    a time-growing premium paid out of the reclaimed lamports
//!
//! Every operation is all-or-nothing: state is staged, the supply
//! conservation invariant is checked, and only then committed.
//!
//! [`ResolverGate`]: escrowswap_registry::ResolverGate

pub mod engine;
pub mod escrow;
pub mod ledger;
pub mod supply_conservation;

pub use engine::{EscrowAccounts, SettlementEngine, SourceDeposit};
pub use escrow::{EscrowRecord, EscrowStore};
pub use ledger::Ledger;
pub use supply_conservation::SupplyConservation;
