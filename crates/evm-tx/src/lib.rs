//! evm-tx: Contract bindings and transaction payload building for EVM chains
//!
//! Provides the Solidity call bindings composed by the router, bridging id
//! helpers, and the `TransactionPayloadBuilder` seam.

pub mod contracts;
pub mod ids;
pub mod payload;

pub use ids::{external_id, EMPTY_ID};
pub use payload::{
    EvmPayloadBuilder, MetaRouteParams, PayloadBuilders, TransactionPayloadBuilder,
    TransactionRequest,
};
