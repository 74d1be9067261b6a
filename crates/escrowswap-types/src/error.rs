//! Error types for the EscrowSwap settlement engine.
//!
//! All errors use the `ES_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by class:
//! - 1xx: Validation errors (malformed terms, asset mismatch, expired order)
//! - 2xx: State errors (missing escrow, insufficient balance, timing)
//! - 3xx: Authorization errors
//! - 4xx: Arithmetic errors (overflow / underflow)
//! - 9xx: Configuration / internal errors
//!
//! Every error aborts the whole operation; nothing is retried internally.

use thiserror::Error;

use crate::Address;

/// Coarse classification of an [`EscrowSwapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    State,
    Authorization,
    Arithmetic,
    Configuration,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::State => write!(f, "STATE"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Arithmetic => write!(f, "ARITHMETIC"),
            Self::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}

/// Central error enum for all EscrowSwap operations.
#[derive(Debug, Error)]
pub enum EscrowSwapError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The order terms failed validation.
    #[error("ES_ERR_100: Invalid order terms: {reason}")]
    InvalidOrderTerms { reason: String },

    /// The order is already past its expiration time.
    #[error("ES_ERR_101: Order expired at {expiration}, now {now}")]
    OrderExpired { expiration: u32, now: u32 },

    /// Declared asset kind disagrees with the asset actually supplied.
    #[error("ES_ERR_102: Asset kind mismatch: {reason}")]
    AssetKindMismatch { reason: String },

    /// An optional account is required by the terms but was not supplied.
    #[error("ES_ERR_103: Missing required account: {account}")]
    MissingAccount { account: &'static str },

    /// The supplied terms do not re-derive the stored escrow record.
    #[error("ES_ERR_104: Order terms do not match escrow {address}")]
    TermsMismatch { address: Address },

    /// An amount argument was zero where a positive value is required.
    #[error("ES_ERR_105: Amount must be positive")]
    ZeroAmount,

    // =================================================================
    // State Errors (2xx)
    // =================================================================
    /// No open escrow record exists at this address.
    #[error("ES_ERR_200: Escrow not found: {0}")]
    EscrowNotFound(Address),

    /// An escrow record already exists at this address.
    #[error("ES_ERR_201: Escrow already exists: {0}")]
    EscrowAlreadyExists(Address),

    /// The fill amount exceeds the unfilled escrow balance.
    #[error("ES_ERR_202: Insufficient escrow balance: requested {requested}, available {available}")]
    InsufficientEscrowBalance { requested: u64, available: u64 },

    /// Cancel-by-resolver attempted before the order expired.
    #[error("ES_ERR_203: Cancellation auction not started: expiration {expiration}, now {now}")]
    CancellationNotStarted { expiration: u32, now: u32 },

    /// Cancel-by-resolver attempted on an order without a premium.
    #[error("ES_ERR_204: Order has no cancellation premium configured")]
    NoCancellationPremium,

    /// A ledger account lacks the funds for a transfer.
    #[error("ES_ERR_205: Insufficient funds in {owner} ({asset}): need {needed}, have {available}")]
    InsufficientFunds {
        owner: Address,
        asset: String,
        needed: u64,
        available: u64,
    },

    /// A capability is already registered for this identity.
    #[error("ES_ERR_206: Capability already registered: {0}")]
    CapabilityAlreadyRegistered(Address),

    /// No capability is registered for this identity.
    #[error("ES_ERR_207: Capability not found: {0}")]
    CapabilityNotFound(Address),

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// The caller holds no active resolver capability.
    #[error("ES_ERR_300: Resolver not authorized: {0}")]
    ResolverNotAuthorized(Address),

    /// The caller is not the maker of the escrow.
    #[error("ES_ERR_301: Caller {caller} is not the maker")]
    NotMaker { caller: Address },

    // =================================================================
    // Arithmetic Errors (4xx)
    // =================================================================
    /// A computation overflowed its integer width.
    #[error("ES_ERR_400: Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    /// A subtraction went below zero.
    #[error("ES_ERR_401: Arithmetic underflow in {context}")]
    ArithmeticUnderflow { context: &'static str },

    /// A ratio had a zero denominator.
    #[error("ES_ERR_402: Division by zero in {context}")]
    DivisionByZero { context: &'static str },

    // =================================================================
    // Configuration / Internal (9xx)
    // =================================================================
    /// Configuration error (invalid config file, bad values, etc.).
    #[error("ES_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("ES_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Supply conservation invariant violated. Critical safety alert.
    #[error("ES_ERR_902: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },
}

impl EscrowSwapError {
    /// The taxonomy class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidOrderTerms { .. }
            | Self::OrderExpired { .. }
            | Self::AssetKindMismatch { .. }
            | Self::MissingAccount { .. }
            | Self::TermsMismatch { .. }
            | Self::ZeroAmount => ErrorKind::Validation,
            Self::EscrowNotFound(_)
            | Self::EscrowAlreadyExists(_)
            | Self::InsufficientEscrowBalance { .. }
            | Self::CancellationNotStarted { .. }
            | Self::NoCancellationPremium
            | Self::InsufficientFunds { .. }
            | Self::CapabilityAlreadyRegistered(_)
            | Self::CapabilityNotFound(_) => ErrorKind::State,
            Self::ResolverNotAuthorized(_) | Self::NotMaker { .. } => ErrorKind::Authorization,
            Self::ArithmeticOverflow { .. }
            | Self::ArithmeticUnderflow { .. }
            | Self::DivisionByZero { .. } => ErrorKind::Arithmetic,
            Self::Configuration(_)
            | Self::Serialization(_)
            | Self::SupplyInvariantViolation { .. } => ErrorKind::Configuration,
        }
    }

    pub(crate) fn invalid_terms(reason: impl Into<String>) -> Self {
        Self::InvalidOrderTerms {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowSwapError>;

impl From<serde_json::Error> for EscrowSwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
