//! # escrowswap-types
//!
//! Shared types, errors, and configuration for the **EscrowSwap** settlement
//! engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`MintId`], [`OrderHash`]
//! - **Addressing**: [`derive_address`], [`escrow_address`], [`resolver_access_address`]
//! - **Assets**: [`AssetKind`], [`FungibleMint`], [`LedgerAsset`]
//! - **Order model**: [`OrderTerms`], [`FeeTerms`], [`AuctionTerms`], [`RatePoint`]
//! - **Codec**: [`CanonicalEncode`], [`order_hash`]
//! - **Execution context**: [`ExecutionContext`]
//! - **Events / receipts**: [`SettlementEvent`], [`FillReceipt`], [`CancelReceipt`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`EscrowSwapError`] with `ES_ERR_` prefix codes
//! - **Constants**: rate bases, seeds and defaults
//!
//! The codec lives here so that every caller (engine and client alike)
//! serializes order terms through the same routine.

pub mod address;
pub mod asset;
pub mod codec;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod event;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use escrowswap_types::{OrderTerms, AssetKind, Address, ...};

pub use address::*;
pub use asset::*;
pub use codec::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use event::*;
pub use order::*;

// Constants are accessed via `escrowswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
