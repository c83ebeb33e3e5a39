//! Transaction payload building
//!
//! The router hands a fully assembled [`MetaRouteParams`] to the builder
//! registered for the source chain's [`ChainKind`]. Only the EVM builder lives
//! here; other chain families plug in through [`PayloadBuilders::register`].

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use omni_core::{ChainConfig, ChainId, ChainKind, ConfigError, Result};
use serde::{Deserialize, Serialize};

use crate::contracts::IMetaRouter;

/// Arguments of one `metaRoute` call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRouteParams {
    /// Leg A calldata (empty when the input is already the transit token)
    pub first_swap_calldata: Bytes,
    /// Unused by cross-chain routes, kept for same-chain two-hop swaps
    pub second_swap_calldata: Bytes,
    /// Tokens the router pulls and approves, in spend order
    pub approved_tokens: Vec<Address>,
    pub first_dex_router: Address,
    pub second_dex_router: Address,
    pub amount: U256,
    /// Input is the chain's gas token, forwarded as call value
    pub native_in: bool,
    /// Contract that receives Leg A output and relays the bridging call
    pub relay_recipient: Address,
    /// Bridging call executed by `relay_recipient`
    pub other_side_calldata: Bytes,
}

impl MetaRouteParams {
    pub fn encode(&self) -> Bytes {
        let call = IMetaRouter::metaRouteCall {
            txn: IMetaRouter::MetaRouteTransaction {
                firstSwapCalldata: self.first_swap_calldata.clone(),
                secondSwapCalldata: self.second_swap_calldata.clone(),
                approvedTokens: self.approved_tokens.clone(),
                firstDexRouter: self.first_dex_router,
                secondDexRouter: self.second_dex_router,
                amount: self.amount,
                nativeIn: self.native_in,
                relayRecipient: self.relay_recipient,
                otherSideCalldata: self.other_side_calldata.clone(),
            },
        };
        Bytes::from(call.abi_encode())
    }

    /// Call value the transaction must carry
    pub fn value(&self) -> U256 {
        if self.native_in {
            self.amount
        } else {
            U256::ZERO
        }
    }
}

/// Chain-native transaction ready for signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chainKind", rename_all = "camelCase")]
#[non_exhaustive]
pub enum TransactionRequest {
    #[serde(rename_all = "camelCase")]
    Evm {
        chain_id: ChainId,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
    },
}

impl TransactionRequest {
    pub fn chain_id(&self) -> ChainId {
        match self {
            Self::Evm { chain_id, .. } => *chain_id,
        }
    }
}

/// Turns assembled `metaRoute` parameters into a signable transaction
pub trait TransactionPayloadBuilder: Send + Sync {
    fn chain_kind(&self) -> ChainKind;

    fn build(
        &self,
        params: &MetaRouteParams,
        chain: &ChainConfig,
        from: Address,
    ) -> Result<TransactionRequest>;
}

/// Builder for EVM chains: a plain call to the chain's meta router
#[derive(Debug, Clone, Copy, Default)]
pub struct EvmPayloadBuilder;

impl TransactionPayloadBuilder for EvmPayloadBuilder {
    fn chain_kind(&self) -> ChainKind {
        ChainKind::Evm
    }

    fn build(
        &self,
        params: &MetaRouteParams,
        chain: &ChainConfig,
        from: Address,
    ) -> Result<TransactionRequest> {
        let data = params.encode();
        tracing::debug!(
            chain_id = %chain.id,
            to = %chain.meta_router,
            data_len = data.len(),
            "Built metaRoute transaction"
        );
        Ok(TransactionRequest::Evm {
            chain_id: chain.id,
            from,
            to: chain.meta_router,
            data,
            value: params.value(),
        })
    }
}

/// Payload builders keyed by chain family
#[derive(Clone)]
pub struct PayloadBuilders {
    builders: HashMap<ChainKind, Arc<dyn TransactionPayloadBuilder>>,
}

impl Default for PayloadBuilders {
    fn default() -> Self {
        let mut builders = Self {
            builders: HashMap::new(),
        };
        builders.register(Arc::new(EvmPayloadBuilder));
        builders
    }
}

impl PayloadBuilders {
    pub fn register(&mut self, builder: Arc<dyn TransactionPayloadBuilder>) {
        self.builders.insert(builder.chain_kind(), builder);
    }

    /// Build with the builder registered for `chain.kind`
    pub fn build(
        &self,
        params: &MetaRouteParams,
        chain: &ChainConfig,
        from: Address,
    ) -> Result<TransactionRequest> {
        let builder = self.builders.get(&chain.kind).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "no payload builder for {:?} chain {}",
                chain.kind, chain.id
            ))
        })?;
        builder.build(params, chain, from)
    }
}

impl std::fmt::Debug for PayloadBuilders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadBuilders")
            .field("kinds", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}
