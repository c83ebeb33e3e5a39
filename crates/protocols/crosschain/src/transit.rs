//! Bridging leg
//!
//! A transit moves value through the omnipool on the host chain. It is
//! quoted once by [`Transit::init`]; bridging fees learned afterwards are
//! folded in by [`ReadyTransit::apply_fees`], which reprices the existing pool
//! quote linearly instead of asking the pool again.
//!
//! Fee tokens depend on the direction:
//! - mint: fee 1 is paid in the host representation of the input, taken from
//!   the pool input;
//! - burn: fee 1 is paid in `token_out`, taken from the pool output;
//! - v2: fee 1 as for mint, fee 2 in `token_out` taken from the pool output.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use evm_tx::contracts::{IFeeCollector, COLLECT_FEE_AMOUNT_OFFSET};
use octopool::{skim_volume_fee, OctoPoolTrade, PoolQuoter};
use omni_core::{
    reprice, AmountError, ChainId, ChainPriority, Deadline, OmniPoolConfig, Result, SlippageBps,
    Token, TokenAmount, TradeLeg, TradeQuote,
};

use crate::direction::{get_direction, BridgeDirection};
use crate::fee_collector::FeeCollectorRegistry;
use crate::representation::{require_representation, RepresentationLookup};
use crate::state::{MulticallCalls, PostCall, TransitOutResult};

/// Shared collaborators of a transit
#[derive(Clone)]
pub struct TransitContext {
    pub representations: Arc<dyn RepresentationLookup>,
    pub chain_priority: ChainPriority,
    pub fee_collectors: Arc<FeeCollectorRegistry>,
    pub quoter: Arc<dyn PoolQuoter>,
    /// Host multicall router; receives the pool output
    pub multicall_router: Address,
}

impl fmt::Debug for TransitContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitContext")
            .field("chain_priority", &self.chain_priority)
            .field("multicall_router", &self.multicall_router)
            .finish()
    }
}

/// Inputs of one bridging leg
#[derive(Debug, Clone)]
pub struct TransitParams {
    pub amount_in: TokenAmount,
    pub amount_in_min: TokenAmount,
    pub token_out: Token,
    pub slippage: SlippageBps,
    pub deadline: Deadline,
    pub pool: OmniPoolConfig,
    pub fee1: Option<TokenAmount>,
    pub fee2: Option<TokenAmount>,
}

/// Configured, not yet quoted bridging leg
#[derive(Debug, Clone)]
pub struct Transit {
    ctx: TransitContext,
    params: TransitParams,
    direction: BridgeDirection,
    fee_token1: Token,
    fee_token2: Option<Token>,
}

fn ensure_fee_token(fee: Option<&TokenAmount>, expected: Option<&Token>) -> Result<()> {
    let Some(fee) = fee else {
        return Ok(());
    };
    match expected {
        Some(token) if *token == fee.token => Ok(()),
        _ => Err(AmountError::TokenMismatch {
            expected: expected.map_or_else(|| "no fee".to_string(), |t| t.to_string()),
            found: fee.token.to_string(),
        }
        .into()),
    }
}

fn subtract_fee(
    amount: &TokenAmount,
    amount_min: &TokenAmount,
    fee: &TokenAmount,
) -> Result<(TokenAmount, TokenAmount)> {
    if amount_min.raw <= fee.raw {
        return Err(AmountError::LessThanFee {
            amount: amount_min.to_string(),
            fee: fee.to_string(),
        }
        .into());
    }
    Ok((amount.checked_sub(fee)?, amount_min.checked_sub(fee)?))
}

impl Transit {
    /// Resolve direction and fee tokens; reject fees in the wrong token
    pub fn new(ctx: TransitContext, params: TransitParams) -> Result<Self> {
        let host = params.pool.chain_id;
        let direction = get_direction(
            params.amount_in.token.chain_id,
            params.token_out.chain_id,
            host,
            &ctx.chain_priority,
        )?;

        let fee_token1 = match direction {
            BridgeDirection::Burn => params.token_out.clone(),
            _ => require_representation(ctx.representations.as_ref(), &params.amount_in.token, host)?,
        };
        let fee_token2 = match direction {
            BridgeDirection::V2 => Some(params.token_out.clone()),
            _ => None,
        };

        ensure_fee_token(params.fee1.as_ref(), Some(&fee_token1))?;
        ensure_fee_token(params.fee2.as_ref(), fee_token2.as_ref())?;

        Ok(Self {
            ctx,
            params,
            direction,
            fee_token1,
            fee_token2,
        })
    }

    pub fn direction(&self) -> BridgeDirection {
        self.direction
    }

    pub fn fee_token1(&self) -> &Token {
        &self.fee_token1
    }

    pub fn fee_token2(&self) -> Option<&Token> {
        self.fee_token2.as_ref()
    }

    pub fn host_chain_id(&self) -> ChainId {
        self.params.pool.chain_id
    }

    /// Pool swap input: the deposit, less fee 1 unless burning
    fn trade_input(&self, fee1: Option<&TokenAmount>) -> Result<(TokenAmount, TokenAmount)> {
        if self.direction == BridgeDirection::Burn {
            return Ok((self.params.amount_in.clone(), self.params.amount_in_min.clone()));
        }

        let amount_in = self.params.amount_in.retype(&self.fee_token1);
        let amount_in_min = self.params.amount_in_min.retype(&self.fee_token1);
        match fee1 {
            Some(fee) => subtract_fee(&amount_in, &amount_in_min, fee),
            None => Ok((amount_in, amount_in_min)),
        }
    }

    fn trade_output_token(&self) -> Result<Token> {
        match self.direction {
            BridgeDirection::Mint => Ok(self.params.token_out.clone()),
            BridgeDirection::Burn | BridgeDirection::V2 => Ok(require_representation(
                self.ctx.representations.as_ref(),
                &self.params.token_out,
                self.host_chain_id(),
            )?),
        }
    }

    /// Volume fee skim, then the output-side bridging fee
    fn finish(
        &self,
        trade: TradeQuote,
        fee1: Option<&TokenAmount>,
        fee2: Option<&TokenAmount>,
    ) -> Result<TransitOutResult> {
        let mut amount_out = trade.amount_out.clone();
        let mut amount_out_min = trade.amount_out_min.clone();

        let involved = [self.params.amount_in.token.chain_id, self.params.token_out.chain_id];
        let collector = self.ctx.fee_collectors.find(
            self.host_chain_id(),
            &involved,
            &self.params.pool.coin_gecko_id,
        );

        let mut post_call = None;
        let mut volume_fee = None;
        if let Some(collector) = collector {
            let skimmed = skim_volume_fee(amount_out.raw, collector.fee_rate)?;
            let skimmed_min = skim_volume_fee(amount_out_min.raw, collector.fee_rate)?;

            let calldata = IFeeCollector::collectFeeCall {
                token: amount_out.token.address,
                amount: amount_out.raw,
            }
            .abi_encode();
            post_call = Some(PostCall {
                calldata: Bytes::from(calldata),
                receive_side: collector.address,
                path: amount_out.token.address,
                offset: COLLECT_FEE_AMOUNT_OFFSET,
            });
            volume_fee = Some(TokenAmount::new(
                amount_out.token.clone(),
                amount_out.raw - skimmed,
            ));

            amount_out.raw = skimmed;
            amount_out_min.raw = skimmed_min;
        }

        let mut amount_out = amount_out.retype(&self.params.token_out);
        let mut amount_out_min = amount_out_min.retype(&self.params.token_out);

        let output_fee = match self.direction {
            BridgeDirection::Mint => None,
            BridgeDirection::Burn => fee1,
            BridgeDirection::V2 => fee2,
        };
        if let Some(fee) = output_fee {
            (amount_out, amount_out_min) = subtract_fee(&amount_out, &amount_out_min, fee)?;
        }

        if amount_out.is_zero() {
            return Err(AmountError::TooLow {
                amount: amount_out.to_string(),
                reason: "nothing left after bridging fees".to_string(),
            }
            .into());
        }

        Ok(TransitOutResult {
            trade,
            post_call,
            volume_fee,
            amount_out,
            amount_out_min,
        })
    }

    /// Quote the pool swap
    pub async fn init(self) -> Result<ReadyTransit> {
        let (amount_in, amount_in_min) = self.trade_input(self.params.fee1.as_ref())?;
        let token_out = self.trade_output_token()?;

        let trade = OctoPoolTrade::new(
            self.params.pool.clone(),
            self.ctx.quoter.clone(),
            amount_in,
            amount_in_min,
            token_out,
            self.ctx.multicall_router,
            self.params.slippage,
            self.params.deadline,
        );
        let quote = trade.init().await?;
        let out = self.finish(
            quote.clone(),
            self.params.fee1.as_ref(),
            self.params.fee2.as_ref(),
        )?;

        tracing::debug!(
            direction = %self.direction,
            host = %self.host_chain_id(),
            amount_out = %out.amount_out,
            "Transit quoted"
        );

        Ok(ReadyTransit {
            transit: self,
            base_quote: quote,
            out,
        })
    }
}

/// Quoted bridging leg
#[derive(Debug, Clone)]
pub struct ReadyTransit {
    transit: Transit,
    /// Pool quote as returned by the pool, before any repricing
    base_quote: TradeQuote,
    out: TransitOutResult,
}

impl ReadyTransit {
    /// Fold known bridging fees into the quote without re-quoting the pool.
    ///
    /// The input is re-derived from the original deposit, so applying fees
    /// twice never compounds.
    pub fn apply_fees(&self, fee1: TokenAmount, fee2: Option<TokenAmount>) -> Result<ReadyTransit> {
        ensure_fee_token(Some(&fee1), Some(&self.transit.fee_token1))?;
        ensure_fee_token(fee2.as_ref(), self.transit.fee_token2.as_ref())?;

        let mut transit = self.transit.clone();
        transit.params.fee1 = Some(fee1);
        transit.params.fee2 = fee2;

        let (amount_in, amount_in_min) = transit.trade_input(transit.params.fee1.as_ref())?;
        let quote = reprice(&self.base_quote, &amount_in, &amount_in_min)?;
        let out = transit.finish(
            quote,
            transit.params.fee1.as_ref(),
            transit.params.fee2.as_ref(),
        )?;

        Ok(ReadyTransit {
            transit,
            base_quote: self.base_quote.clone(),
            out,
        })
    }

    /// Pool swap first, then the optional volume fee skim
    pub fn calls(&self) -> MulticallCalls {
        let mut calls = MulticallCalls::default();
        let trade = &self.out.trade;
        calls.push(
            trade.call_data.clone(),
            trade.router_address,
            trade.token_in().address,
            trade.call_data_offset.unwrap_or_default(),
        );
        if let Some(post_call) = &self.out.post_call {
            calls.push(
                post_call.calldata.clone(),
                post_call.receive_side,
                post_call.path,
                post_call.offset,
            );
        }
        calls
    }

    /// Amount crossing the bridge: the pool output when burning, otherwise
    /// the deposit on the source chain
    pub fn bridge_amount_in(&self) -> TokenAmount {
        match self.transit.direction {
            BridgeDirection::Burn => self.out.trade.amount_out.clone(),
            _ => self.transit.params.amount_in.clone(),
        }
    }

    pub fn direction(&self) -> BridgeDirection {
        self.transit.direction
    }

    pub fn is_v2(&self) -> bool {
        self.transit.direction == BridgeDirection::V2
    }

    pub fn host_chain_id(&self) -> ChainId {
        self.transit.host_chain_id()
    }

    pub fn fee_token1(&self) -> &Token {
        &self.transit.fee_token1
    }

    pub fn fee_token2(&self) -> Option<&Token> {
        self.transit.fee_token2.as_ref()
    }

    pub fn fee1(&self) -> Option<&TokenAmount> {
        self.transit.params.fee1.as_ref()
    }

    pub fn fee2(&self) -> Option<&TokenAmount> {
        self.transit.params.fee2.as_ref()
    }

    pub fn amount_in(&self) -> &TokenAmount {
        &self.transit.params.amount_in
    }

    pub fn token_out(&self) -> &Token {
        &self.transit.params.token_out
    }

    pub fn pool(&self) -> &OmniPoolConfig {
        &self.transit.params.pool
    }

    pub fn amount_out(&self) -> &TokenAmount {
        &self.out.amount_out
    }

    pub fn amount_out_min(&self) -> &TokenAmount {
        &self.out.amount_out_min
    }

    pub fn trade(&self) -> &TradeQuote {
        &self.out.trade
    }

    pub fn output(&self) -> &TransitOutResult {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee_collector::FeeCollector;
    use crate::test_fixtures::*;
    use alloy_primitives::U256;
    use omni_core::calldata::read_word;

    fn params(amount_in: u64, amount_in_min: u64, token_out: Token) -> TransitParams {
        TransitParams {
            amount_in: TokenAmount::new(usdc_eth(), U256::from(amount_in)),
            amount_in_min: TokenAmount::new(usdc_eth(), U256::from(amount_in_min)),
            token_out,
            slippage: 100,
            deadline: 1_700_000_000,
            pool: pool(),
            fee1: None,
            fee2: None,
        }
    }

    #[tokio::test]
    async fn test_scenario_mint_without_fees() {
        let transit = Transit::new(context(), params(100_000_000, 90_000_000, busd_bsc())).unwrap();
        assert_eq!(transit.direction(), BridgeDirection::Mint);
        assert_eq!(*transit.fee_token1(), s_usdc_eth());
        assert!(transit.fee_token2().is_none());

        let ready = transit.init().await.unwrap();
        assert_eq!(ready.amount_out().raw, e18(80));
        assert_eq!(
            ready.amount_out_min().raw,
            U256::from(71_280_000_000_000_000_000u128)
        );
        assert_eq!(ready.amount_out().token, busd_bsc());
    }

    #[tokio::test]
    async fn test_scenario_v2_fees_applied() {
        let transit = Transit::new(context(), params(100_000_000, 90_000_000, usdt_avax())).unwrap();
        assert_eq!(transit.direction(), BridgeDirection::V2);
        assert_eq!(transit.fee_token2(), Some(&usdt_avax()));

        let ready = transit.init().await.unwrap();
        assert_eq!(ready.amount_out().raw, e18(80));

        let patched = ready
            .apply_fees(
                TokenAmount::new(s_usdc_eth(), U256::from(10_000_000u64)),
                Some(TokenAmount::new(usdt_avax(), e18(20))),
            )
            .unwrap();
        assert_eq!(patched.trade().token_amount_in.raw, U256::from(90_000_000u64));
        assert_eq!(patched.trade().amount_out.raw, e18(72));
        assert_eq!(patched.amount_out().raw, e18(52));
        assert_eq!(patched.amount_out().token, usdt_avax());
        assert!(patched.amount_out_min().raw <= patched.amount_out().raw);
    }

    #[tokio::test]
    async fn test_apply_fees_composition_law() {
        let ready = Transit::new(context(), params(100_000_000, 90_000_000, busd_bsc()))
            .unwrap()
            .init()
            .await
            .unwrap();
        for fee in [1u64, 7_500_000, 33_333_333] {
            let patched = ready
                .apply_fees(TokenAmount::new(s_usdc_eth(), U256::from(fee)), None)
                .unwrap();
            // r = 80e18 / 100e6
            let expected = U256::from(100_000_000u64 - fee) * U256::from(800_000_000_000u64);
            assert_eq!(patched.amount_out().raw, expected);
        }
    }

    #[tokio::test]
    async fn test_apply_fees_does_not_compound() {
        let ready = Transit::new(context(), params(100_000_000, 90_000_000, busd_bsc()))
            .unwrap()
            .init()
            .await
            .unwrap();
        let fee = TokenAmount::new(s_usdc_eth(), U256::from(10_000_000u64));
        let once = ready.apply_fees(fee.clone(), None).unwrap();
        let twice = once.apply_fees(fee, None).unwrap();
        assert_eq!(once.amount_out(), twice.amount_out());
        assert_eq!(once.trade().call_data, twice.trade().call_data);
    }

    #[tokio::test]
    async fn test_scenario_fee_consumes_minimum() {
        let mut p = params(100_000_000, 90_000_000, busd_bsc());
        p.fee1 = Some(TokenAmount::new(s_usdc_eth(), U256::from(90_000_000u64)));
        let err = Transit::new(context(), p).unwrap().init().await.unwrap_err();
        assert_eq!(err.error_code(), "amount_less_than_fee");

        let ready = Transit::new(context(), params(100_000_000, 90_000_000, busd_bsc()))
            .unwrap()
            .init()
            .await
            .unwrap();
        let err = ready
            .apply_fees(TokenAmount::new(s_usdc_eth(), U256::from(95_000_000u64)), None)
            .unwrap_err();
        assert_eq!(err.error_code(), "amount_less_than_fee");
    }

    #[test]
    fn test_fee_token_mismatch_rejected_at_construction() {
        let mut p = params(100, 90, busd_bsc());
        p.fee1 = Some(TokenAmount::new(usdc_eth(), U256::from(1u64)));
        let err = Transit::new(context(), p).unwrap_err();
        assert_eq!(err.error_code(), "token_mismatch");

        let mut p = params(100, 90, busd_bsc());
        p.fee2 = Some(TokenAmount::new(busd_bsc(), U256::from(1u64)));
        let err = Transit::new(context(), p).unwrap_err();
        assert_eq!(err.error_code(), "token_mismatch");
    }

    #[test]
    fn test_missing_representation() {
        let mut p = params(100, 90, busd_bsc());
        let unknown = Token::new(ETH, Address::repeat_byte(0x77), 18, "XYZ");
        p.amount_in = TokenAmount::new(unknown.clone(), U256::from(100u64));
        p.amount_in_min = TokenAmount::new(unknown, U256::from(90u64));
        let err = Transit::new(context(), p).unwrap_err();
        assert_eq!(err.error_code(), "missing_representation");
    }

    #[tokio::test]
    async fn test_burn_takes_fee_from_output() {
        let p = TransitParams {
            amount_in: TokenAmount::new(busd_bsc(), e18(100)),
            amount_in_min: TokenAmount::new(busd_bsc(), e18(90)),
            token_out: usdt_avax(),
            slippage: 100,
            deadline: 1_700_000_000,
            pool: pool(),
            fee1: None,
            fee2: None,
        };
        let ctx = context_with_ratio(U256::from(8u64), U256::from(10u64));
        let ready = Transit::new(ctx, p).unwrap().init().await.unwrap();
        assert_eq!(ready.direction(), BridgeDirection::Burn);
        assert_eq!(*ready.fee_token1(), usdt_avax());
        assert_eq!(ready.trade().amount_out.token, s_usdt_avax());
        assert_eq!(ready.bridge_amount_in().raw, e18(80));

        let patched = ready
            .apply_fees(TokenAmount::new(usdt_avax(), e18(5)), None)
            .unwrap();
        // input untouched, output less the fee
        assert_eq!(patched.trade().amount_out.raw, e18(80));
        assert_eq!(patched.amount_out().raw, e18(75));
        assert_eq!(patched.amount_out().token, usdt_avax());
    }

    #[tokio::test]
    async fn test_bridge_amount_in_is_deposit_for_mint() {
        let ready = Transit::new(context(), params(100_000_000, 90_000_000, busd_bsc()))
            .unwrap()
            .init()
            .await
            .unwrap();
        assert_eq!(ready.bridge_amount_in().token, usdc_eth());
        assert_eq!(ready.bridge_amount_in().raw, U256::from(100_000_000u64));
    }

    #[tokio::test]
    async fn test_volume_fee_skim_and_calls() {
        let mut ctx = context();
        ctx.fee_collectors = Arc::new(FeeCollectorRegistry::new(vec![FeeCollector {
            chain_id: BSC,
            address: Address::repeat_byte(0xfc),
            // 1%
            fee_rate: U256::from(10_000_000_000_000_000u64),
            eligible_chains: vec![ETH, BSC, AVAX],
            excluded_coin_gecko_ids: vec![],
        }]));

        let ready = Transit::new(ctx, params(100_000_000, 90_000_000, busd_bsc()))
            .unwrap()
            .init()
            .await
            .unwrap();
        assert_eq!(ready.amount_out().raw, U256::from(79_200_000_000_000_000_000u128));
        assert_eq!(
            ready.output().volume_fee.as_ref().unwrap().raw,
            U256::from(800_000_000_000_000_000u128)
        );
        assert!(ready.amount_out_min().raw <= ready.amount_out().raw);

        let calls = ready.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls.receive_sides, vec![pool().address, Address::repeat_byte(0xfc)]);
        assert_eq!(calls.paths, vec![s_usdc_eth().address, busd_bsc().address]);
        assert_eq!(
            read_word(&calls.calldatas[0], calls.offsets[0]).unwrap(),
            U256::from(100_000_000u64)
        );
        assert_eq!(
            read_word(&calls.calldatas[1], calls.offsets[1]).unwrap(),
            e18(80)
        );
    }

    #[tokio::test]
    async fn test_calls_without_collector() {
        let ready = Transit::new(context(), params(100_000_000, 90_000_000, busd_bsc()))
            .unwrap()
            .init()
            .await
            .unwrap();
        let calls = ready.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls.receive_sides[0], pool().address);
        assert!(ready.output().post_call.is_none());
    }
}
