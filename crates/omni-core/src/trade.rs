//! Trade leg contract
//!
//! Every swap leg (omnipool swap, wrap, DEX aggregator) implements
//! [`TradeLeg`]. Quoting returns a [`TradeQuote`]; the quote is the only way to
//! reach a leg's output, so there is no "read before init" state to guard.
//!
//! Fee patching reprices an existing quote with [`reprice`] instead of asking
//! the provider again. The rescale is linear in the input amount, which is
//! exact only for zero-impact pools; callers accept that accuracy loss in
//! exchange for skipping a second quote round-trip.

use std::fmt;

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::calldata::patch_word;
use crate::math::mul_div;
use crate::{AmountError, Result, Token, TokenAmount};

/// Realised quote of one trade leg
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeQuote {
    /// Provider label (e.g. "octopool", "wrap", "1inch")
    pub provider: String,
    pub token_amount_in: TokenAmount,
    pub token_amount_in_min: TokenAmount,
    pub amount_out: TokenAmount,
    pub amount_out_min: TokenAmount,
    /// Call to execute on `router_address`
    pub call_data: Bytes,
    /// Patch point of the input amount word in `call_data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_data_offset: Option<usize>,
    /// Patch point of the minimum-received word in `call_data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_received_offset: Option<usize>,
    pub router_address: Address,
    /// Price impact in percent
    pub price_impact: f64,
    /// Tokens traversed, input first
    pub route: Vec<Token>,
}

impl TradeQuote {
    pub fn token_in(&self) -> &Token {
        &self.token_amount_in.token
    }

    pub fn token_out(&self) -> &Token {
        &self.amount_out.token
    }
}

/// A swap leg that can be quoted into a [`TradeQuote`]
#[async_trait]
pub trait TradeLeg: Send + Sync + fmt::Debug {
    /// Provider label used in route reporting
    fn provider(&self) -> &str;

    /// Quote the leg and build its calldata
    async fn init(&self) -> Result<TradeQuote>;
}

/// Reprice `quote` for a new input without re-quoting.
///
/// Outputs scale by `new_in / old_in` (and `new_in_min / old_in_min` for the
/// minimum). The input and minimum-received words in the calldata are
/// rewritten in place, leaving every patch point valid.
pub fn reprice(
    quote: &TradeQuote,
    new_amount_in: &TokenAmount,
    new_amount_in_min: &TokenAmount,
) -> Result<TradeQuote> {
    for amount in [new_amount_in, new_amount_in_min] {
        if amount.token != quote.token_amount_in.token {
            return Err(AmountError::TokenMismatch {
                expected: quote.token_amount_in.token.to_string(),
                found: amount.token.to_string(),
            }
            .into());
        }
    }

    let old_in = quote.token_amount_in.raw;
    if old_in.is_zero() {
        return Err(AmountError::TooLow {
            amount: quote.token_amount_in.to_string(),
            reason: "cannot rescale a zero-input quote".to_string(),
        }
        .into());
    }

    let amount_out = mul_div(quote.amount_out.raw, new_amount_in.raw, old_in)?;

    let old_in_min = quote.token_amount_in_min.raw;
    let amount_out_min = if old_in_min.is_zero() {
        mul_div(quote.amount_out_min.raw, new_amount_in.raw, old_in)?
    } else {
        mul_div(quote.amount_out_min.raw, new_amount_in_min.raw, old_in_min)?
    };
    let amount_out_min = amount_out_min.min(amount_out);

    let mut call_data = quote.call_data.clone();
    if let Some(offset) = quote.call_data_offset {
        call_data = patch_word(&call_data, offset, new_amount_in.raw)?;
    }
    if let Some(offset) = quote.min_received_offset {
        call_data = patch_word(&call_data, offset, amount_out_min)?;
    }

    Ok(TradeQuote {
        token_amount_in: new_amount_in.clone(),
        token_amount_in_min: new_amount_in_min.clone(),
        amount_out: TokenAmount::new(quote.amount_out.token.clone(), amount_out),
        amount_out_min: TokenAmount::new(quote.amount_out_min.token.clone(), amount_out_min),
        call_data,
        ..quote.clone()
    })
}
