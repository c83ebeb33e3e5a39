//! Exact-input cross-chain swap orchestration
//!
//! A route is up to three legs around one bridging transit:
//! - Leg A: source-chain swap into the transit token (optional);
//! - Leg B: the omnipool transit on the host chain;
//! - Leg C: destination-chain swap out of the transit token (optional).
//!
//! Bridging fees are priced on a provisional call built with zero fees, then
//! folded back into the already quoted legs with [`reprice`]. Nothing is
//! re-quoted after the fee fetch; the pool output is assumed to scale linearly
//! with its input, which is exact only for a pool with no price impact.

use std::fmt;
use std::sync::Arc;

use advisor_client::{BridgeFeeRequest, FeeEstimator};
use alloy_primitives::{Address, Bytes};
use evm_tx::{MetaRouteParams, PayloadBuilders};
use futures::future::try_join;
use octopool::{PoolQuoter, WrapTrade};
use omni_core::math::mul_div;
use omni_core::{
    reprice, total_price_impact, AmountError, AppConfig, ChainConfig, ChainId, ConfigError, Deadline, Result,
    SlippageBps, Token, TokenAmount, TradeLeg, TradeQuote,
};

use crate::bridge_calls::{client_id_bytes, provisional_fee, BridgeCallComposer, RelayedCall};
use crate::constants::{fee_labels, providers};
use crate::direction::BridgeDirection;
use crate::fee_collector::FeeCollectorRegistry;
use crate::representation::{transit_token, RepresentationLookup};
use crate::slippage::SlippageSplitter;
use crate::state::{FeeItem, RouteItem, SwapExactInParams, SwapExactInResult};
use crate::transit::{ReadyTransit, Transit, TransitContext, TransitParams};

/// Inputs for building a DEX leg (A or C)
#[derive(Debug, Clone)]
pub struct LegRequest {
    pub amount_in: TokenAmount,
    pub amount_in_min: TokenAmount,
    pub token_out: Token,
    pub slippage: SlippageBps,
    pub deadline: Deadline,
    pub from: Address,
    /// Recipient of the leg output
    pub to: Address,
}

/// Picks the trade implementation for a DEX leg
pub trait TradeLegFactory: Send + Sync {
    fn build(&self, request: &LegRequest) -> Result<Box<dyn TradeLeg>>;
}

/// Wraps native gas tokens; anything else goes to `inner` when set
#[derive(Default)]
pub struct DefaultLegFactory {
    pub inner: Option<Arc<dyn TradeLegFactory>>,
}

impl TradeLegFactory for DefaultLegFactory {
    fn build(&self, request: &LegRequest) -> Result<Box<dyn TradeLeg>> {
        if WrapTrade::is_supported(&request.amount_in.token, &request.token_out) {
            return Ok(Box::new(WrapTrade::new(
                request.amount_in.clone(),
                request.amount_in_min.clone(),
                request.token_out.clone(),
            )));
        }
        match &self.inner {
            Some(inner) => inner.build(request),
            None => Err(ConfigError::Invalid(format!(
                "no trade provider for {} -> {}",
                request.amount_in.token, request.token_out
            ))
            .into()),
        }
    }
}

/// Collaborators of the orchestrator
#[derive(Clone)]
pub struct SwapContext {
    pub config: Arc<AppConfig>,
    pub representations: Arc<dyn RepresentationLookup>,
    pub quoter: Arc<dyn PoolQuoter>,
    pub fee_estimator: Arc<dyn FeeEstimator>,
    pub leg_factory: Arc<dyn TradeLegFactory>,
    pub splitter: Arc<dyn SlippageSplitter>,
    pub fee_collectors: Arc<FeeCollectorRegistry>,
    pub payload_builders: PayloadBuilders,
}

impl fmt::Debug for SwapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapContext")
            .field("chain_priority", &self.config.chain_priority)
            .field("payload_builders", &self.payload_builders)
            .finish()
    }
}

/// One exact-input swap. Consumed by [`SwapExactIn::exact_in`].
#[derive(Debug)]
pub struct SwapExactIn {
    ctx: SwapContext,
}

/// Refund address for `chain`. Tron and TON need one given explicitly; EVM
/// chains refund to `from`.
fn revertable_address(
    chain: &ChainConfig,
    explicit: Option<Address>,
    from: Address,
) -> Result<Address> {
    match explicit {
        Some(address) => Ok(address),
        None if chain.kind.requires_explicit_refund() => Err(ConfigError::Invalid(format!(
            "{:?} chain {} requires an explicit revert address",
            chain.kind, chain.id
        ))
        .into()),
        None => Ok(from),
    }
}

fn fee_request(relayed: RelayedCall, from: ChainId, to: ChainId, client_id: &str) -> BridgeFeeRequest {
    BridgeFeeRequest {
        chain_id_from: from,
        chain_id_to: to,
        receive_side: relayed.receive_side,
        call_data: relayed.calldata,
        client_id: client_id.to_string(),
    }
}

/// `transit_min * final_out / transit_out`, in the final token
fn hop_fee_label(from: ChainId, to: ChainId) -> String {
    format!("{} ({} -> {})", fee_labels::CROSS_CHAIN_FEE, from, to)
}

fn scaled_min(transit: &ReadyTransit, final_out: &TokenAmount) -> Result<TokenAmount> {
    let raw = mul_div(
        transit.amount_out_min().raw,
        final_out.raw,
        transit.amount_out().raw,
    )?;
    Ok(TokenAmount::new(final_out.token.clone(), raw.min(final_out.raw)))
}

/// Bridging route: deposit token, pool path, released token
fn bridge_route(transit: &ReadyTransit) -> RouteItem {
    let mut tokens = vec![transit.amount_in().token.clone()];
    tokens.extend(transit.trade().route.iter().cloned());
    tokens.push(transit.token_out().clone());
    tokens.dedup();
    RouteItem {
        provider: providers::BRIDGE.to_string(),
        tokens,
    }
}

impl SwapExactIn {
    pub fn new(ctx: SwapContext) -> Self {
        Self { ctx }
    }

    async fn init_leg(&self, request: LegRequest) -> Result<TradeQuote> {
        let leg = self.ctx.leg_factory.build(&request)?;
        let quote = leg.init().await?;
        tracing::debug!(
            provider = leg.provider(),
            amount_in = %quote.token_amount_in,
            amount_out = %quote.amount_out,
            "Leg quoted"
        );
        Ok(quote)
    }

    /// Fetch fee 1 and, for v2, fee 2 concurrently
    async fn fetch_fees(
        &self,
        transit: &ReadyTransit,
        first: BridgeFeeRequest,
        second: Option<BridgeFeeRequest>,
    ) -> Result<(TokenAmount, Option<TokenAmount>)> {
        let estimator = self.ctx.fee_estimator.as_ref();
        let (fee1, fee2) = match &second {
            Some(second) => {
                let (fee1, fee2) =
                    try_join(estimator.bridge_fee(&first), estimator.bridge_fee(second)).await?;
                (fee1, Some(fee2))
            }
            None => (estimator.bridge_fee(&first).await?, None),
        };

        let fee1 = fee1.to_amount(transit.fee_token1());
        let fee2 = match (fee2, transit.fee_token2()) {
            (Some(fee), Some(token)) => Some(fee.to_amount(token)),
            _ => None,
        };
        Ok((fee1, fee2))
    }

    /// Compose the swap. Any failing step aborts; no partial result is returned.
    pub async fn exact_in(self, params: SwapExactInParams) -> Result<SwapExactInResult> {
        let config = self.ctx.config.clone();
        let lookup = self.ctx.representations.as_ref();
        let pool = &params.omni_pool;

        let chain_in = config.chain(params.token_amount_in.token.chain_id)?;
        let chain_out = config.chain(params.token_out.chain_id)?;
        let host = config.chain(pool.chain_id)?;

        let transit_token_in = match &params.transit_token_in {
            Some(token) => token.clone(),
            None => transit_token(lookup, pool, chain_in.id)?,
        };
        let transit_token_out = match &params.transit_token_out {
            Some(token) => token.clone(),
            None => transit_token(lookup, pool, chain_out.id)?,
        };

        let revertable_source =
            revertable_address(chain_in, params.revert_address_source, params.from)?;
        let revertable_destination =
            revertable_address(chain_out, params.revert_address_destination, params.from)?;

        let has_leg_a = params.token_amount_in.token != transit_token_in;
        let has_leg_c = params.token_out != transit_token_out;
        let split = self.ctx.splitter.split(params.slippage, has_leg_a, has_leg_c)?;

        tracing::debug!(
            chain_in = %chain_in.id,
            chain_out = %chain_out.id,
            host = %host.id,
            has_leg_a,
            has_leg_c,
            "Composing exact-in swap"
        );

        let leg_a = if has_leg_a {
            Some(
                self.init_leg(LegRequest {
                    amount_in: params.token_amount_in.clone(),
                    amount_in_min: params.token_amount_in.clone(),
                    token_out: transit_token_in.clone(),
                    slippage: split.a,
                    deadline: params.deadline,
                    from: params.from,
                    to: chain_in.meta_router,
                })
                .await?,
            )
        } else {
            None
        };

        let (amount_in, amount_in_min) = match &leg_a {
            Some(quote) if quote.amount_out.is_zero() => {
                return Err(AmountError::TooLow {
                    amount: quote.amount_out.to_string(),
                    reason: "source swap returns nothing to bridge".to_string(),
                }
                .into());
            }
            Some(quote) => (quote.amount_out.clone(), quote.amount_out_min.clone()),
            None => (params.token_amount_in.clone(), params.token_amount_in.clone()),
        };

        let transit_ctx = TransitContext {
            representations: self.ctx.representations.clone(),
            chain_priority: config.chain_priority.clone(),
            fee_collectors: self.ctx.fee_collectors.clone(),
            quoter: self.ctx.quoter.clone(),
            multicall_router: host.multicall_router,
        };
        let transit = Transit::new(
            transit_ctx,
            TransitParams {
                amount_in,
                amount_in_min,
                token_out: transit_token_out,
                slippage: split.b,
                deadline: params.deadline,
                pool: pool.clone(),
                fee1: None,
                fee2: None,
            },
        )?
        .init()
        .await?;

        let leg_c_to = if params.leg_c_to_multicall {
            chain_out.multicall_router
        } else {
            params.to
        };
        let leg_c = if has_leg_c {
            Some(
                self.init_leg(LegRequest {
                    amount_in: transit.amount_out().clone(),
                    amount_in_min: transit.amount_out_min().clone(),
                    token_out: params.token_out.clone(),
                    slippage: split.c,
                    deadline: params.deadline,
                    from: params.from,
                    to: leg_c_to,
                })
                .await?,
            )
        } else {
            None
        };

        let direction = transit.direction();
        let composer = BridgeCallComposer {
            direction,
            chain_in,
            host,
            chain_out,
            from: params.from,
            to: params.to,
            revertable_source,
            revertable_destination,
            client_id: client_id_bytes(&config.client_id),
        };

        // Provisional calls carry zero fees; the advisor prices their shape
        let zero_fee1 = provisional_fee(transit.fee_token1());
        let zero_fee2 = transit.fee_token2().map(provisional_fee);
        let (relayed1, relayed2) =
            composer.relayed_calls(&transit, leg_c.as_ref(), &zero_fee1, zero_fee2.as_ref());
        let first = match direction {
            BridgeDirection::Burn => fee_request(relayed1, host.id, chain_out.id, &config.client_id),
            BridgeDirection::Mint | BridgeDirection::V2 => {
                fee_request(relayed1, chain_in.id, host.id, &config.client_id)
            }
        };
        let second =
            relayed2.map(|relayed| fee_request(relayed, host.id, chain_out.id, &config.client_id));

        let (fee1, fee2) = self.fetch_fees(&transit, first, second).await?;
        tracing::debug!(
            direction = %direction,
            fee1 = %fee1,
            fee2 = ?fee2.as_ref().map(|f| f.to_string()),
            "Bridging fees fetched"
        );

        let transit = transit.apply_fees(fee1.clone(), fee2.clone())?;
        let leg_c = leg_c
            .map(|quote| reprice(&quote, transit.amount_out(), transit.amount_out_min()))
            .transpose()?;

        let token_amount_out = match &leg_c {
            Some(quote) => quote.amount_out.clone(),
            None => transit.amount_out().clone(),
        };
        let token_amount_out_min = scaled_min(&transit, &token_amount_out)?;

        let source = composer.source_call(&transit, leg_c.as_ref(), &fee1, fee2.as_ref());

        let mut approved_tokens = vec![params.token_amount_in.token.address];
        if let Some(quote) = &leg_a {
            approved_tokens.push(quote.token_out().address);
        }
        let meta_route = MetaRouteParams {
            first_swap_calldata: leg_a
                .as_ref()
                .map(|q| q.call_data.clone())
                .unwrap_or_default(),
            second_swap_calldata: Bytes::new(),
            approved_tokens,
            first_dex_router: leg_a.as_ref().map_or(Address::ZERO, |q| q.router_address),
            second_dex_router: Address::ZERO,
            amount: params.token_amount_in.raw,
            native_in: params.token_amount_in.token.is_native,
            relay_recipient: source.relay_recipient,
            other_side_calldata: source.calldata,
        };
        let transaction_request =
            self.ctx
                .payload_builders
                .build(&meta_route, chain_in, params.from)?;

        // Two-hop routes name the hop each fee pays for
        let fee1_label = match &fee2 {
            Some(_) => hop_fee_label(chain_in.id, host.id),
            None => fee_labels::CROSS_CHAIN_FEE.to_string(),
        };
        let mut fees = vec![FeeItem {
            provider: providers::BRIDGE.to_string(),
            description: fee1_label,
            value: fee1,
        }];
        if let Some(fee2) = fee2 {
            fees.push(FeeItem {
                provider: providers::BRIDGE.to_string(),
                description: hop_fee_label(host.id, chain_out.id),
                value: fee2,
            });
        }
        if let Some(volume_fee) = &transit.output().volume_fee {
            fees.push(FeeItem {
                provider: providers::VOLUME_FEE_COLLECTOR.to_string(),
                description: fee_labels::VOLUME_FEE.to_string(),
                value: volume_fee.clone(),
            });
        }

        let mut routes = Vec::new();
        let mut impacts = Vec::new();
        if let Some(quote) = &leg_a {
            routes.push(RouteItem {
                provider: quote.provider.clone(),
                tokens: quote.route.clone(),
            });
            impacts.push(quote.price_impact);
        }
        routes.push(bridge_route(&transit));
        impacts.push(transit.trade().price_impact);
        if let Some(quote) = &leg_c {
            routes.push(RouteItem {
                provider: quote.provider.clone(),
                tokens: quote.route.clone(),
            });
            impacts.push(quote.price_impact);
        }

        tracing::info!(
            direction = %direction,
            chain_in = %chain_in.id,
            chain_out = %chain_out.id,
            amount_in = %params.token_amount_in,
            amount_out = %token_amount_out,
            amount_out_min = %token_amount_out_min,
            "Composed cross-chain swap"
        );

        Ok(SwapExactInResult {
            direction,
            token_amount_out,
            token_amount_out_min,
            price_impact: total_price_impact(&impacts),
            fees,
            routes,
            approve_to: chain_in.meta_router_gateway,
            meta_route,
            transaction_request,
        })
    }
}
