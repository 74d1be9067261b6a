//! 32-byte identifiers and deterministic address derivation.
//!
//! Every party, mint and derived record is named by 32 raw bytes. Derived
//! addresses are SHA-256 commitments over length-prefixed seeds plus the
//! owning program identity, so any caller holding the same seeds computes
//! the same address.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{EscrowSwapError, constants};

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub [u8; 32]);

        impl $name {
            #[must_use]
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            #[must_use]
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// First four bytes in hex, for log lines.
            #[must_use]
            pub fn short(&self) -> String {
                hex::encode(&self.0[..4])
            }

            /// Parse from a 64-character hex string.
            pub fn from_hex(s: &str) -> crate::Result<Self> {
                let raw = hex::decode(s)
                    .map_err(|e| EscrowSwapError::Serialization(format!("{}: {e}", stringify!($name))))?;
                let bytes: [u8; 32] = raw.try_into().map_err(|v: Vec<u8>| {
                    EscrowSwapError::Serialization(format!(
                        "{}: expected 32 bytes, got {}",
                        stringify!($name),
                        v.len()
                    ))
                })?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl TryFrom<String> for $name {
            type Error = EscrowSwapError;

            fn try_from(s: String) -> crate::Result<Self> {
                Self::from_hex(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                hex::encode(id.0)
            }
        }
    };
}

hex_id! {
    /// Identity of a party (maker, resolver, fee recipient) or of a derived
    /// record (escrow, capability).
    Address
}

hex_id! {
    /// Identity of a fungible asset.
    MintId
}

hex_id! {
    /// Canonical 32-byte digest of an order's terms.
    OrderHash
}

impl MintId {
    /// Mint of the fungible (wrapped) representation of the native asset.
    pub const NATIVE: Self = Self(constants::NATIVE_MINT);

    #[must_use]
    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }
}

/// Derive a deterministic address from `seeds` under `program_id`.
///
/// Each seed is length-prefixed so `["ab", "c"]` and `["a", "bc"]` never
/// collide.
#[must_use]
pub fn derive_address(program_id: &Address, seeds: &[&[u8]]) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(constants::DERIVED_ADDRESS_DOMAIN);
    for seed in seeds {
        hasher.update((seed.len() as u64).to_le_bytes());
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    Address(bytes)
}

/// Address of the escrow record for `(maker, order_hash)`.
#[must_use]
pub fn escrow_address(program_id: &Address, maker: &Address, order_hash: &OrderHash) -> Address {
    derive_address(
        program_id,
        &[constants::ESCROW_SEED, maker.as_bytes(), order_hash.as_bytes()],
    )
}

/// Address of the capability record for a resolver identity.
#[must_use]
pub fn resolver_access_address(registry_program_id: &Address, identity: &Address) -> Address {
    derive_address(
        registry_program_id,
        &[constants::RESOLVER_ACCESS_SEED, identity.as_bytes()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: Address = Address(constants::DEFAULT_PROGRAM_ID);

    #[test]
    fn derive_is_deterministic() {
        let a = derive_address(&PROGRAM, &[b"escrow", &[1; 32]]);
        let b = derive_address(&PROGRAM, &[b"escrow", &[1; 32]]);
        assert_eq!(a, b);
    }

    #[test]
    fn seed_boundaries_matter() {
        let a = derive_address(&PROGRAM, &[b"ab", b"c"]);
        let b = derive_address(&PROGRAM, &[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn program_id_matters() {
        let other = Address([9; 32]);
        assert_ne!(
            derive_address(&PROGRAM, &[b"escrow"]),
            derive_address(&other, &[b"escrow"])
        );
    }

    #[test]
    fn escrow_address_depends_on_maker_and_hash() {
        let maker = Address([1; 32]);
        let hash = OrderHash([2; 32]);
        let base = escrow_address(&PROGRAM, &maker, &hash);
        assert_ne!(base, escrow_address(&PROGRAM, &Address([3; 32]), &hash));
        assert_ne!(base, escrow_address(&PROGRAM, &maker, &OrderHash([4; 32])));
    }

    #[test]
    fn escrow_and_access_domains_differ() {
        let id = Address([5; 32]);
        let access = resolver_access_address(&PROGRAM, &id);
        let escrow = escrow_address(&PROGRAM, &id, &OrderHash([0; 32]));
        assert_ne!(access, escrow);
    }

    #[test]
    fn hex_roundtrip() {
        let addr = Address([0xAB; 32]);
        let parsed = Address::from_hex(&addr.to_string()).unwrap();
        assert_eq!(addr, parsed);
        assert_eq!(addr.short(), "abababab");
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(Address::from_hex("abcd").is_err());
        assert!(MintId::from_hex("zz").is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let mint = MintId([0x11; 32]);
        let json = serde_json::to_string(&mint).unwrap();
        assert_eq!(json, format!("\"{}\"", "11".repeat(32)));
        let back: MintId = serde_json::from_str(&json).unwrap();
        assert_eq!(mint, back);
    }

    #[test]
    fn native_mint_flag() {
        assert!(MintId::NATIVE.is_native());
        assert!(!MintId([0; 32]).is_native());
    }
}
