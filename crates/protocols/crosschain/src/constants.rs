//! Cross-chain Constants

/// Fee descriptions reported in swap results
pub mod fee_labels {
    pub const CROSS_CHAIN_FEE: &str = "Cross-chain fee";
    pub const VOLUME_FEE: &str = "Volume fee";
}

/// Provider labels reported in routes and fees
pub mod providers {
    pub const BRIDGE: &str = "omniroute-bridge";
    pub const VOLUME_FEE_COLLECTOR: &str = "volume-fee-collector";
}

/// Slippage split parameters
pub mod slippage {
    /// Floor for every active leg (0.2%)
    pub const MIN_LEG_SLIPPAGE_BPS: u32 = 20;

    /// Share reserved for the bridging pool swap when DEX legs exist (0.2%)
    pub const TRANSIT_SLIPPAGE_BPS: u32 = 20;
}
