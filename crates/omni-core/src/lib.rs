//! Omni-core: Shared types, errors, configuration, and the trade leg contract
//!
//! This crate provides the foundational types used across the Omniroute workspace.

pub mod calldata;
pub mod config;
pub mod errors;
pub mod math;
pub mod trade;
pub mod types;

pub use config::*;
pub use errors::*;
pub use trade::{reprice, TradeLeg, TradeQuote};
pub use types::*;
