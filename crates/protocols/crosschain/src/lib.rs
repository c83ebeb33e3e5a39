//! Cross-Chain Swap Composition
//!
//! Composes an exact-input swap from chain X to chain Y into one signable
//! transaction: an optional source-chain swap, a bridging transit through the
//! shared omnipool, and an optional destination-chain swap.
//!
//! Amounts that only exist at execution time are written on-chain: every
//! nested call carries the byte offset of its 32-byte amount word, and the
//! contract forwarding it overwrites that word with what it actually holds.

pub mod bridge_calls;
pub mod constants;
pub mod direction;
pub mod fee_collector;
pub mod representation;
pub mod slippage;
pub mod state;
pub mod swapping;
pub mod transit;

#[cfg(test)]
mod test_fixtures;

pub use bridge_calls::{client_id_bytes, encode_multicall, BridgeCallComposer, FinalCall};
pub use direction::{get_direction, BridgeDirection};
pub use fee_collector::{FeeCollector, FeeCollectorRegistry};
pub use representation::{
    require_representation, transit_token, RepresentationEntry, RepresentationLookup,
    RepresentationTable,
};
pub use slippage::{SlippageSplit, SlippageSplitter, WeightedSlippageSplit};
pub use state::{
    FeeItem, MulticallCalls, PostCall, RouteItem, SwapExactInParams, SwapExactInResult,
    TransitOutResult,
};
pub use swapping::{DefaultLegFactory, LegRequest, SwapContext, SwapExactIn, TradeLegFactory};
pub use transit::{ReadyTransit, Transit, TransitContext, TransitParams};
