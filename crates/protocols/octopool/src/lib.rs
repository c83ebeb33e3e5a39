//! Omnipool Protocol Implementation
//!
//! Trade legs that run inside or next to the shared omnipool: the pool swap
//! used for bridging, and native-token wrapping.

pub mod calculator;
pub mod constants;
pub mod pool_trade;
pub mod quoter;
pub mod wrap;

// Re-exports
pub use calculator::{apply_slippage, calculate_price_impact, min_amount_out, skim_volume_fee};
pub use constants::{providers, BPS_DENOM, FEE_RATE_SCALE};
pub use pool_trade::OctoPoolTrade;
pub use quoter::{PoolQuoter, RpcPoolQuoter};
pub use wrap::WrapTrade;
