//! Cross-chain State Types
//!
//! Request/result types of the swap orchestrator and the call descriptors the
//! transit engine emits.

use alloy_primitives::{Address, Bytes};
use evm_tx::{MetaRouteParams, TransactionRequest};
use omni_core::{Deadline, OmniPoolConfig, SlippageBps, Token, TokenAmount, TradeQuote};
use serde::{Deserialize, Serialize};

use crate::direction::BridgeDirection;

/// Fee charged along the route (reporting only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeItem {
    pub provider: String,
    pub description: String,
    pub value: TokenAmount,
}

/// One leg of the route (reporting only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteItem {
    pub provider: String,
    pub tokens: Vec<Token>,
}

/// Extra call executed after the pool swap (volume fee skim)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCall {
    pub calldata: Bytes,
    pub receive_side: Address,
    /// Token the call spends
    pub path: Address,
    pub offset: usize,
}

/// Calls for a multicall router, as parallel arrays.
///
/// `paths[i]` is the token call `i` spends; `offsets[i]` is where the router
/// writes the amount it holds of that token before making the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticallCalls {
    pub calldatas: Vec<Bytes>,
    pub receive_sides: Vec<Address>,
    pub paths: Vec<Address>,
    pub offsets: Vec<usize>,
}

impl MulticallCalls {
    pub fn push(&mut self, calldata: Bytes, receive_side: Address, path: Address, offset: usize) {
        self.calldatas.push(calldata);
        self.receive_sides.push(receive_side);
        self.paths.push(path);
        self.offsets.push(offset);
    }

    pub fn len(&self) -> usize {
        self.calldatas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calldatas.is_empty()
    }
}

/// Realised output of the bridging leg
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitOutResult {
    /// Pool swap quote
    pub trade: TradeQuote,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_call: Option<PostCall>,
    /// Skimmed by the volume fee collector, in pool output units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_fee: Option<TokenAmount>,
    /// Output in units of the transit's `token_out`, after fees
    pub amount_out: TokenAmount,
    pub amount_out_min: TokenAmount,
}

/// Exact-input cross-chain swap request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapExactInParams {
    pub token_amount_in: TokenAmount,
    pub token_out: Token,
    pub from: Address,
    pub to: Address,
    /// Total tolerance across all legs
    pub slippage: SlippageBps,
    pub deadline: Deadline,
    pub omni_pool: OmniPoolConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_token_in: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_token_out: Option<Token>,
    /// Refund address on the source chain (required for Tron/TON sources)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_address_source: Option<Address>,
    /// Refund address on the destination chain (required for Tron/TON destinations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_address_destination: Option<Address>,
    /// Deliver Leg C output to the destination multicall router instead of `to`
    #[serde(default)]
    pub leg_c_to_multicall: bool,
}

/// Composed swap, ready to sign
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapExactInResult {
    pub direction: BridgeDirection,
    pub token_amount_out: TokenAmount,
    pub token_amount_out_min: TokenAmount,
    /// Percent, capped at 100
    pub price_impact: f64,
    pub fees: Vec<FeeItem>,
    pub routes: Vec<RouteItem>,
    /// Spender the user must approve on the source chain
    pub approve_to: Address,
    pub meta_route: MetaRouteParams,
    pub transaction_request: TransactionRequest,
}
