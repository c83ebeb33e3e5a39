//! Omnipool Constants

/// Provider labels reported in routes
pub mod providers {
    pub const OCTOPOOL: &str = "octopool";
    pub const WRAP: &str = "wrap";
}

/// Basis-point denominator (10000 bps = 100%)
pub const BPS_DENOM: u32 = 10_000;

/// Scale of volume fee rates (1e18 = 100%)
pub const FEE_RATE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Default JSON-RPC request timeout for pool quotes
pub const RPC_REQUEST_TIMEOUT_SECS: u64 = 20;
