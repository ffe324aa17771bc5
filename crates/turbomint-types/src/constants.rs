//! System-wide constants for the Turbomint escrow.

/// Decimal places of the settlement token.
pub const TBTC_DECIMALS: u32 = 18;

/// Default fill-fee divisor: the filler keeps `lot_size / 20`, a 5% incentive.
pub const DEFAULT_FEE_DIVISOR: u64 = 20;

/// Signer-fee divisor used by standard deposits (0.05% of the lot).
pub const DEFAULT_SIGNER_FEE_DIVISOR: u64 = 2000;

/// Domain separator for receipt digests.
pub const RECEIPT_DOMAIN: &[u8] = b"turbomint:receipt:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Turbomint";
