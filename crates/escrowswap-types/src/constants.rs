//! System-wide constants for the EscrowSwap settlement engine.

/// Denominator for protocol and integrator fee rates (1 unit = 0.001%).
pub const FEE_BASE: u64 = 100_000;

/// Denominator for the surplus share (1 unit = 1%).
pub const SURPLUS_BASE: u64 = 100;

/// Denominator for Dutch-auction rate bumps (1 unit = 0.001%).
pub const RATE_BUMP_BASE: u64 = 100_000;

/// Seed tag for escrow record addresses.
pub const ESCROW_SEED: &[u8] = b"escrow";

/// Seed tag for resolver capability addresses.
pub const RESOLVER_ACCESS_SEED: &[u8] = b"resolver_access";

/// Domain separator for derived addresses.
pub const DERIVED_ADDRESS_DOMAIN: &[u8] = b"escrowswap:derived_address:v1";

/// Domain separator for order hashes.
pub const ORDER_HASH_DOMAIN: &[u8] = b"escrowswap:order_hash:v1";

/// Identity of the settlement program (default deployment).
pub const DEFAULT_PROGRAM_ID: [u8; 32] = *b"escrowswap-settlement-program-01";

/// Identity of the resolver registry program (default deployment).
pub const DEFAULT_REGISTRY_PROGRAM_ID: [u8; 32] = *b"escrowswap-resolver-registry-v01";

/// Mint of the fungible representation of the native asset.
pub const NATIVE_MINT: [u8; 32] = *b"escrowswap-wrapped-native-mint01";

/// Lamports an escrow record must hold to exist. Paid by the maker at
/// creation and reclaimed when the record closes.
pub const DEFAULT_ESCROW_RENT_LAMPORTS: u64 = 2_039_280;

/// Maximum number of decay points in a Dutch auction.
pub const DEFAULT_MAX_AUCTION_POINTS: usize = 8;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "EscrowSwap";
