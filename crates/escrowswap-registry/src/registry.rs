//! In-memory resolver capability registry.

use std::collections::HashMap;

use escrowswap_types::{Address, EscrowSwapError, Result, resolver_access_address};
use serde::{Deserialize, Serialize};

use crate::gate::ResolverGate;

/// Whether a registered resolver may currently act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityState {
    Active,
    /// Temporarily barred; the record is kept for reactivation.
    Suspended,
}

impl std::fmt::Display for CapabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Suspended => write!(f, "SUSPENDED"),
        }
    }
}

/// A resolver's capability record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// The resolver this record authorizes.
    pub identity: Address,
    pub state: CapabilityState,
    /// When the capability was granted (unix seconds).
    pub granted_at: u32,
}

/// Registry of resolver capabilities keyed by their derived access address.
pub struct ResolverRegistry {
    /// Identity under which access addresses are derived.
    program_id: Address,
    capabilities: HashMap<Address, Capability>,
}

impl ResolverRegistry {
    #[must_use]
    pub fn new(program_id: Address) -> Self {
        Self {
            program_id,
            capabilities: HashMap::new(),
        }
    }

    /// Address of the capability record for `identity`.
    #[must_use]
    pub fn access_address(&self, identity: &Address) -> Address {
        resolver_access_address(&self.program_id, identity)
    }

    /// Grant an active capability.
    ///
    /// # Errors
    /// Returns `CapabilityAlreadyRegistered` if a record exists, whatever
    /// its state.
    pub fn register(&mut self, identity: Address, now: u32) -> Result<Address> {
        let address = self.access_address(&identity);
        if self.capabilities.contains_key(&address) {
            return Err(EscrowSwapError::CapabilityAlreadyRegistered(identity));
        }
        self.capabilities.insert(
            address,
            Capability {
                identity,
                state: CapabilityState::Active,
                granted_at: now,
            },
        );
        tracing::info!(resolver = %identity.short(), access = %address.short(), "resolver registered");
        Ok(address)
    }

    /// Bar a resolver without removing its record.
    pub fn suspend(&mut self, identity: &Address) -> Result<()> {
        self.set_state(identity, CapabilityState::Suspended)?;
        tracing::warn!(resolver = %identity.short(), "resolver suspended");
        Ok(())
    }

    /// Lift a suspension.
    pub fn reactivate(&mut self, identity: &Address) -> Result<()> {
        self.set_state(identity, CapabilityState::Active)?;
        tracing::info!(resolver = %identity.short(), "resolver reactivated");
        Ok(())
    }

    /// Remove a capability entirely.
    pub fn deregister(&mut self, identity: &Address) -> Result<Capability> {
        let address = self.access_address(identity);
        let removed = self
            .capabilities
            .remove(&address)
            .ok_or(EscrowSwapError::CapabilityNotFound(*identity))?;
        tracing::info!(resolver = %identity.short(), "resolver deregistered");
        Ok(removed)
    }

    /// Current state, if registered.
    #[must_use]
    pub fn status(&self, identity: &Address) -> Option<CapabilityState> {
        self.get(identity).map(|cap| cap.state)
    }

    #[must_use]
    pub fn get(&self, identity: &Address) -> Option<&Capability> {
        self.capabilities.get(&self.access_address(identity))
    }

    /// Number of registered capabilities, active or suspended.
    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    #[must_use]
    pub fn program_id(&self) -> Address {
        self.program_id
    }

    fn set_state(&mut self, identity: &Address, state: CapabilityState) -> Result<()> {
        let address = self.access_address(identity);
        let cap = self
            .capabilities
            .get_mut(&address)
            .ok_or(EscrowSwapError::CapabilityNotFound(*identity))?;
        cap.state = state;
        Ok(())
    }
}

impl ResolverGate for ResolverRegistry {
    fn is_authorized(&self, identity: &Address) -> bool {
        self.status(identity) == Some(CapabilityState::Active)
    }
}
