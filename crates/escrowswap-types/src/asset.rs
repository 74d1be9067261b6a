//! Asset kinds.
//!
//! An order's source and destination are each either the native asset or
//! a fungible asset identified by its mint. The wrapped-native mint cannot
//! be tagged as fungible: [`FungibleMint`] refuses it at construction and
//! at deserialization, so the only way to name the native asset is
//! [`AssetKind::Native`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EscrowSwapError, MintId, Result};

/// A mint that is guaranteed not to be the wrapped-native mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "MintId", into = "MintId")]
pub struct FungibleMint(MintId);

impl FungibleMint {
    /// # Errors
    /// Returns `AssetKindMismatch` for the wrapped-native mint.
    pub fn new(mint: MintId) -> Result<Self> {
        if mint.is_native() {
            return Err(EscrowSwapError::AssetKindMismatch {
                reason: "wrapped-native mint must be declared as the native asset".to_string(),
            });
        }
        Ok(Self(mint))
    }

    #[must_use]
    pub fn mint(&self) -> MintId {
        self.0
    }
}

impl TryFrom<MintId> for FungibleMint {
    type Error = EscrowSwapError;

    fn try_from(mint: MintId) -> Result<Self> {
        Self::new(mint)
    }
}

impl From<FungibleMint> for MintId {
    fn from(mint: FungibleMint) -> Self {
        mint.0
    }
}

/// Source or destination asset of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// The ledger's native asset. Held in custody as the wrapped-native mint.
    Native,
    /// A fungible asset other than wrapped native.
    Fungible(FungibleMint),
}

impl AssetKind {
    /// Fungible asset from a raw mint.
    pub fn fungible(mint: MintId) -> Result<Self> {
        Ok(Self::Fungible(FungibleMint::new(mint)?))
    }

    /// Resolve the kind of a deposited asset from its mint and the caller's
    /// native flag. The flag must hold **iff** the mint is wrapped native.
    ///
    /// # Errors
    /// Returns `AssetKindMismatch` when the flag and the mint disagree in
    /// either direction.
    pub fn from_deposit(mint: MintId, is_native: bool) -> Result<Self> {
        match (mint.is_native(), is_native) {
            (true, true) => Ok(Self::Native),
            (false, false) => Self::fungible(mint),
            (true, false) => Err(EscrowSwapError::AssetKindMismatch {
                reason: "wrapped-native mint deposited with the fungible tag".to_string(),
            }),
            (false, true) => Err(EscrowSwapError::AssetKindMismatch {
                reason: format!("mint {} is not native but the native tag was set", mint.short()),
            }),
        }
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Mint of the custody representation (wrapped native for `Native`).
    #[must_use]
    pub fn mint(&self) -> MintId {
        match self {
            Self::Native => MintId::NATIVE,
            Self::Fungible(mint) => mint.mint(),
        }
    }

    /// How payments in this asset are carried on the ledger.
    #[must_use]
    pub fn payment_asset(&self) -> LedgerAsset {
        match self {
            Self::Native => LedgerAsset::Lamports,
            Self::Fungible(mint) => LedgerAsset::Token(mint.mint()),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Fungible(mint) => write!(f, "FUNGIBLE({})", mint.mint().short()),
        }
    }
}

/// Ledger balance key: raw native lamports, or a token of some mint
/// (including the wrapped-native mint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum LedgerAsset {
    Lamports,
    Token(MintId),
}

impl LedgerAsset {
    /// Whether this balance counts toward the native economic supply
    /// (raw lamports or wrapped-native tokens).
    #[must_use]
    pub fn is_native_supply(&self) -> bool {
        match self {
            Self::Lamports => true,
            Self::Token(mint) => mint.is_native(),
        }
    }
}

impl fmt::Display for LedgerAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lamports => write!(f, "LAMPORTS"),
            Self::Token(mint) if mint.is_native() => write!(f, "WRAPPED_NATIVE"),
            Self::Token(mint) => write!(f, "TOKEN({})", mint.short()),
        }
    }
}
