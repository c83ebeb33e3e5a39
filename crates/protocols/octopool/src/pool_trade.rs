//! Omnipool swap leg
//!
//! Swaps one pool asset into another inside the omnipool. The encoded `swap`
//! call exposes its input amount and minimum output as patch points, so the
//! multicall router can substitute the amount it actually received.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use evm_tx::contracts::{IOctoPool, OCTOPOOL_SWAP_AMOUNT_OFFSET, OCTOPOOL_SWAP_MIN_OUT_OFFSET};
use omni_core::{
    AmountError, Deadline, OmniPoolConfig, Result, SlippageBps, Token, TokenAmount, TradeLeg,
    TradeQuote,
};

use crate::calculator::{calculate_price_impact, min_amount_out};
use crate::constants::providers;
use crate::quoter::PoolQuoter;

/// Omnipool swap between two pool assets
#[derive(Clone)]
pub struct OctoPoolTrade {
    pub pool: OmniPoolConfig,
    pub amount_in: TokenAmount,
    pub amount_in_min: TokenAmount,
    pub token_out: Token,
    /// Recipient of the pool output
    pub to: Address,
    pub slippage: SlippageBps,
    pub deadline: Deadline,
    quoter: Arc<dyn PoolQuoter>,
}

impl fmt::Debug for OctoPoolTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OctoPoolTrade")
            .field("pool", &self.pool.address)
            .field("amount_in", &self.amount_in.to_string())
            .field("token_out", &self.token_out.to_string())
            .field("to", &self.to)
            .field("slippage", &self.slippage)
            .finish()
    }
}

impl OctoPoolTrade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: OmniPoolConfig,
        quoter: Arc<dyn PoolQuoter>,
        amount_in: TokenAmount,
        amount_in_min: TokenAmount,
        token_out: Token,
        to: Address,
        slippage: SlippageBps,
        deadline: Deadline,
    ) -> Self {
        Self {
            pool,
            amount_in,
            amount_in_min,
            token_out,
            to,
            slippage,
            deadline,
            quoter,
        }
    }

    /// One whole unit of the input token, quoted for the spot rate
    fn reference_amount(&self) -> U256 {
        U256::from(10u64).pow(U256::from(self.amount_in.token.decimals))
    }
}

#[async_trait]
impl TradeLeg for OctoPoolTrade {
    fn provider(&self) -> &str {
        providers::OCTOPOOL
    }

    async fn init(&self) -> Result<TradeQuote> {
        if self.amount_in.is_zero() {
            return Err(AmountError::TooLow {
                amount: self.amount_in.to_string(),
                reason: "omnipool swap input is zero".to_string(),
            }
            .into());
        }

        let index_in = self.pool.asset_index(&self.amount_in.token)?;
        let index_out = self.pool.asset_index(&self.token_out)?;

        let amount_out = self
            .quoter
            .calculate_swap(&self.pool, index_in, index_out, self.amount_in.raw)
            .await?;
        let amount_out_min = min_amount_out(
            amount_out,
            self.amount_in.raw,
            self.amount_in_min.raw,
            self.slippage,
        )?;

        let reference_in = self.reference_amount().min(self.amount_in.raw);
        let reference_out = self
            .quoter
            .calculate_swap(&self.pool, index_in, index_out, reference_in)
            .await?;
        let price_impact =
            calculate_price_impact(self.amount_in.raw, amount_out, reference_in, reference_out);

        let call_data = IOctoPool::swapCall {
            indexIn: U256::from(index_in),
            indexOut: U256::from(index_out),
            amount: self.amount_in.raw,
            minAmountOut: amount_out_min,
            to: self.to,
            deadline: U256::from(self.deadline),
        }
        .abi_encode();

        tracing::debug!(
            pool = %self.pool.address,
            amount_in = %self.amount_in,
            amount_out = %amount_out,
            price_impact,
            "Quoted omnipool swap"
        );

        Ok(TradeQuote {
            provider: providers::OCTOPOOL.to_string(),
            token_amount_in: self.amount_in.clone(),
            token_amount_in_min: self.amount_in_min.clone(),
            amount_out: TokenAmount::new(self.token_out.clone(), amount_out),
            amount_out_min: TokenAmount::new(self.token_out.clone(), amount_out_min),
            call_data: Bytes::from(call_data),
            call_data_offset: Some(OCTOPOOL_SWAP_AMOUNT_OFFSET),
            min_received_offset: Some(OCTOPOOL_SWAP_MIN_OUT_OFFSET),
            router_address: self.pool.address,
            price_impact,
            route: vec![self.amount_in.token.clone(), self.token_out.clone()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_core::calldata::read_word;
    use omni_core::{reprice, ChainId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pool quoting a fixed `out / in` ratio; counts quote calls
    struct LinearQuoter {
        numerator: U256,
        denominator: U256,
        calls: AtomicUsize,
    }

    impl LinearQuoter {
        fn new(numerator: U256, denominator: U256) -> Self {
            Self {
                numerator,
                denominator,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PoolQuoter for LinearQuoter {
        async fn calculate_swap(
            &self,
            _pool: &OmniPoolConfig,
            _index_in: u8,
            _index_out: u8,
            amount: U256,
        ) -> Result<U256> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(amount * self.numerator / self.denominator)
        }
    }

    fn s_usdc() -> Token {
        Token::new(ChainId(56), Address::repeat_byte(0xa1), 6, "sUSDC").synthetic_of(ChainId(1))
    }

    fn s_usdt() -> Token {
        Token::new(ChainId(56), Address::repeat_byte(0xa2), 18, "sUSDT").synthetic_of(ChainId(43114))
    }

    fn pool() -> OmniPoolConfig {
        OmniPoolConfig {
            chain_id: ChainId(56),
            address: Address::repeat_byte(0xb0),
            coin_gecko_id: "usd-coin".to_string(),
            assets: vec![s_usdc(), s_usdt()],
        }
    }

    /// 100e6 in -> 80e18 out
    fn quoter() -> Arc<LinearQuoter> {
        Arc::new(LinearQuoter::new(
            U256::from(800_000_000_000u64),
            U256::from(1u64),
        ))
    }

    fn trade(quoter: Arc<LinearQuoter>, amount_in: u64, amount_in_min: u64) -> OctoPoolTrade {
        OctoPoolTrade::new(
            pool(),
            quoter,
            TokenAmount::new(s_usdc(), U256::from(amount_in)),
            TokenAmount::new(s_usdc(), U256::from(amount_in_min)),
            s_usdt(),
            Address::repeat_byte(0xcc),
            100,
            1_700_000_000,
        )
    }

    #[tokio::test]
    async fn test_quote_min_out_with_slippage() {
        let quote = trade(quoter(), 100_000_000, 90_000_000).init().await.unwrap();
        assert_eq!(
            quote.amount_out.raw,
            U256::from(80_000_000_000_000_000_000u128)
        );
        assert_eq!(
            quote.amount_out_min.raw,
            U256::from(71_280_000_000_000_000_000u128)
        );
        assert!(quote.price_impact.abs() < 1e-9);
        assert_eq!(quote.route, vec![s_usdc(), s_usdt()]);
        assert_eq!(quote.router_address, pool().address);
    }

    #[tokio::test]
    async fn test_offsets_point_at_amounts() {
        let quote = trade(quoter(), 100_000_000, 90_000_000).init().await.unwrap();
        let amount_offset = quote.call_data_offset.unwrap();
        let min_offset = quote.min_received_offset.unwrap();
        assert_eq!(
            read_word(&quote.call_data, amount_offset).unwrap(),
            U256::from(100_000_000u64)
        );
        assert_eq!(
            read_word(&quote.call_data, min_offset).unwrap(),
            quote.amount_out_min.raw
        );
    }

    #[tokio::test]
    async fn test_reprice_without_requote() {
        let quoter = quoter();
        let quote = trade(quoter.clone(), 100_000_000, 90_000_000).init().await.unwrap();
        let calls = quoter.calls.load(Ordering::SeqCst);

        let repriced = reprice(
            &quote,
            &TokenAmount::new(s_usdc(), U256::from(90_000_000u64)),
            &TokenAmount::new(s_usdc(), U256::from(80_000_000u64)),
        )
        .unwrap();

        assert_eq!(quoter.calls.load(Ordering::SeqCst), calls);
        assert_eq!(
            repriced.amount_out.raw,
            U256::from(72_000_000_000_000_000_000u128)
        );
        assert_eq!(
            read_word(&repriced.call_data, quote.call_data_offset.unwrap()).unwrap(),
            U256::from(90_000_000u64)
        );
    }

    #[tokio::test]
    async fn test_zero_input_rejected() {
        let err = trade(quoter(), 0, 0).init().await.unwrap_err();
        assert_eq!(err.error_code(), "amount_too_low");
    }

    #[tokio::test]
    async fn test_unknown_pool_asset() {
        let mut t = trade(quoter(), 100, 90);
        t.token_out = Token::new(ChainId(56), Address::repeat_byte(0xff), 18, "XYZ");
        let err = t.init().await.unwrap_err();
        assert_eq!(err.error_code(), "unknown_pool_asset");
    }
}
