//! Native/wrapped trade leg
//!
//! Wrapping and unwrapping are 1:1. Wrapping forwards the amount as call
//! value, so `deposit()` has no amount word to patch. Unwrapping passes the
//! amount as `withdraw(wad)`, and the multicall router rewrites that word
//! with the balance it actually holds.

use alloy_primitives::Bytes;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use evm_tx::contracts::{IWETH, WETH_WITHDRAW_AMOUNT_OFFSET};
use omni_core::{ConfigError, Result, Token, TokenAmount, TradeLeg, TradeQuote};

use crate::constants::providers;

/// Converts between a chain's gas token and its wrapped ERC-20
///
/// The side that is not native is taken to be the wrapped gas token; the
/// caller only routes such pairs here.
#[derive(Debug, Clone)]
pub struct WrapTrade {
    pub amount_in: TokenAmount,
    pub amount_in_min: TokenAmount,
    pub token_out: Token,
}

impl WrapTrade {
    pub fn new(amount_in: TokenAmount, amount_in_min: TokenAmount, token_out: Token) -> Self {
        Self {
            amount_in,
            amount_in_min,
            token_out,
        }
    }

    /// Whether `token_in -> token_out` is a wrap or an unwrap
    pub fn is_supported(token_in: &Token, token_out: &Token) -> bool {
        token_in.chain_id == token_out.chain_id && token_in.is_native != token_out.is_native
    }

    fn is_unwrap(&self) -> bool {
        !self.amount_in.token.is_native
    }
}

#[async_trait]
impl TradeLeg for WrapTrade {
    fn provider(&self) -> &str {
        providers::WRAP
    }

    async fn init(&self) -> Result<TradeQuote> {
        let token_in = &self.amount_in.token;
        if !Self::is_supported(token_in, &self.token_out) {
            return Err(ConfigError::Invalid(format!(
                "cannot wrap {} into {}",
                token_in, self.token_out
            ))
            .into());
        }

        let (call_data, call_data_offset, router_address) = if self.is_unwrap() {
            let call = IWETH::withdrawCall {
                wad: self.amount_in.raw,
            };
            (
                call.abi_encode(),
                Some(WETH_WITHDRAW_AMOUNT_OFFSET),
                token_in.address,
            )
        } else {
            (
                IWETH::depositCall {}.abi_encode(),
                None,
                self.token_out.address,
            )
        };

        Ok(TradeQuote {
            provider: providers::WRAP.to_string(),
            token_amount_in: self.amount_in.clone(),
            token_amount_in_min: self.amount_in_min.clone(),
            amount_out: self.amount_in.retype(&self.token_out),
            amount_out_min: self.amount_in_min.retype(&self.token_out),
            call_data: Bytes::from(call_data),
            call_data_offset,
            min_received_offset: None,
            router_address,
            price_impact: 0.0,
            route: vec![token_in.clone(), self.token_out.clone()],
        })
    }
}
