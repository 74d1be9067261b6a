//! The authorization interface settlement depends on.

use escrowswap_types::Address;

/// Read-only authorization oracle.
///
/// Implementations answer whether `identity` currently holds an active
/// resolver capability. The answer must depend only on registry state.
pub trait ResolverGate {
    fn is_authorized(&self, identity: &Address) -> bool;
}

impl<T: ResolverGate + ?Sized> ResolverGate for &T {
    fn is_authorized(&self, identity: &Address) -> bool {
        (**self).is_authorized(identity)
    }
}

impl<T: ResolverGate + ?Sized> ResolverGate for Box<T> {
    fn is_authorized(&self, identity: &Address) -> bool {
        (**self).is_authorized(identity)
    }
}
