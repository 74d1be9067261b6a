//! # escrowswap-registry
//!
//! **Resolver capability registry.**
//!
//! Decides who may act as a resolver (fill orders, clean up expired ones).
//! The settlement engine consumes it only through the read-only
//! [`ResolverGate`] trait and never writes to it.
//!
//! ## Capability lifecycle
//!
//! ```text
//!   register ──▶ ACTIVE ◀──▶ SUSPENDED
//!                  │              │
//!                  └── deregister ┘
//! ```
//!
//! Each capability lives at a deterministic address derived from
//! `("resolver_access", identity)` under the registry's program id.
//! Suspension revokes authorization without destroying the record.

pub mod gate;
pub mod registry;

pub use gate::ResolverGate;
pub use registry::{Capability, CapabilityState, ResolverRegistry};
