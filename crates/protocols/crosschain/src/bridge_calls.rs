//! Bridging calldata composition
//!
//! Builds the portal, synthesis and multicall calls that carry a route across
//! chains. Amounts produced by an earlier step are never rewritten here: each
//! downstream call travels as a `{receive_side, calldata, offset}` triple and
//! the receiving contract writes the amount it actually holds at `offset`.
//!
//! Layout per direction (host = omnipool chain):
//! - mint: `metaSynthesize` on the source portal, then `metaMintSyntheticToken`
//!   on the host, which runs the host multicall (pool swap, fee skim, Leg C);
//! - burn: the host multicall (pool swap, fee skim, `metaBurnSyntheticToken`)
//!   runs on the source, then `metaUnsynthesize` on the destination portal
//!   runs Leg C through the destination multicall;
//! - v2: the mint layout whose host multicall ends with the burn layout.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use evm_tx::contracts::{
    IMulticallRouter, IPortal, ISynthesis, META_BURN_AMOUNT_OFFSET, MULTICALL_AMOUNT_OFFSET,
};
use evm_tx::{external_id, EMPTY_ID};
use omni_core::{ChainConfig, Token, TokenAmount, TradeQuote};

use crate::direction::BridgeDirection;
use crate::state::MulticallCalls;
use crate::transit::ReadyTransit;

/// `finalReceiveSide` / `finalCalldata` / `finalOffset` of a bridging call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalCall {
    pub receive_side: Address,
    pub calldata: Bytes,
    pub offset: usize,
}

/// Destination-side call a relayer executes; what the fee advisor prices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedCall {
    pub receive_side: Address,
    pub calldata: Bytes,
}

/// Source-side call handed to the meta router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCall {
    pub relay_recipient: Address,
    pub calldata: Bytes,
}

/// `clientID` word: the UTF-8 id, right-padded and truncated to 32 bytes
pub fn client_id_bytes(client_id: &str) -> B256 {
    let bytes = client_id.as_bytes();
    let len = bytes.len().min(32);
    B256::right_padding_from(&bytes[..len])
}

/// Encode a multicall. `output_token` closes the path: the router sends its
/// remaining balance of it to `to`.
pub fn encode_multicall(
    amount_in: U256,
    calls: &MulticallCalls,
    output_token: Address,
    to: Address,
) -> Bytes {
    let mut path = calls.paths.clone();
    path.push(output_token);
    let call = IMulticallRouter::multicallCall {
        amountIn: amount_in,
        calldatas: calls.calldatas.clone(),
        receiveSides: calls.receive_sides.clone(),
        path,
        offsets: calls.offsets.iter().map(|o| U256::from(*o)).collect(),
        to,
    };
    Bytes::from(call.abi_encode())
}

/// Chains and parties of one route
#[derive(Debug, Clone)]
pub struct BridgeCallComposer<'a> {
    pub direction: BridgeDirection,
    pub chain_in: &'a ChainConfig,
    pub host: &'a ChainConfig,
    pub chain_out: &'a ChainConfig,
    pub from: Address,
    /// Final recipient on the destination chain
    pub to: Address,
    pub revertable_source: Address,
    pub revertable_destination: Address,
    pub client_id: B256,
}

impl BridgeCallComposer<'_> {
    /// Leg C behind the destination multicall router
    fn destination_final(&self, leg_c: Option<&TradeQuote>) -> FinalCall {
        let Some(leg_c) = leg_c else {
            return FinalCall::default();
        };
        let mut calls = MulticallCalls::default();
        calls.push(
            leg_c.call_data.clone(),
            leg_c.router_address,
            leg_c.token_in().address,
            leg_c.call_data_offset.unwrap_or_default(),
        );
        FinalCall {
            receive_side: self.chain_out.multicall_router,
            calldata: encode_multicall(
                leg_c.token_amount_in.raw,
                &calls,
                leg_c.token_out().address,
                self.to,
            ),
            offset: MULTICALL_AMOUNT_OFFSET,
        }
    }

    /// Receiver of the unsynthesized tokens on the destination chain
    fn destination_recipient(&self, leg_c: Option<&TradeQuote>) -> Address {
        if leg_c.is_some() {
            self.chain_out.multicall_router
        } else {
            self.to
        }
    }

    fn swap_tokens(transit: &ReadyTransit) -> Vec<Address> {
        transit.trade().route.iter().map(|t| t.address).collect()
    }

    /// `metaBurnSyntheticToken` on the host, releasing on `chain_out`
    fn meta_burn(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        fee: &TokenAmount,
    ) -> Bytes {
        let final_call = self.destination_final(leg_c);
        let call = ISynthesis::metaBurnSyntheticTokenCall {
            txn: ISynthesis::MetaBurnTransaction {
                stableBridgingFee: fee.raw,
                amount: transit.trade().amount_out.raw,
                syntCaller: self.from,
                finalReceiveSide: final_call.receive_side,
                sToken: transit.trade().token_out().address,
                finalCallData: final_call.calldata,
                finalOffset: U256::from(final_call.offset),
                chain2address: self.destination_recipient(leg_c),
                receiveSide: self.chain_out.portal,
                oppositeBridge: self.chain_out.bridge,
                revertableAddress: self.revertable_destination,
                chainID: U256::from(self.chain_out.id.as_u64()),
                clientID: self.client_id,
            },
        };
        Bytes::from(call.abi_encode())
    }

    /// `metaUnsynthesize` on `chain_out`, as relayed after a burn
    fn meta_unsynthesize(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        fee: &TokenAmount,
    ) -> RelayedCall {
        let final_call = self.destination_final(leg_c);
        let call = IPortal::metaUnsynthesizeCall {
            stableBridgingFee: fee.raw,
            crossChainID: EMPTY_ID,
            externalID: external_id(
                EMPTY_ID,
                self.chain_out.portal,
                self.revertable_destination,
                self.chain_out.id,
            ),
            to: self.destination_recipient(leg_c),
            amount: transit.trade().amount_out.raw,
            rToken: transit.token_out().address,
            finalReceiveSide: final_call.receive_side,
            finalCalldata: final_call.calldata,
            finalOffset: U256::from(final_call.offset),
        };
        RelayedCall {
            receive_side: self.chain_out.portal,
            calldata: Bytes::from(call.abi_encode()),
        }
    }

    /// Multicall run on the host: pool swap, optional skim, then either the
    /// burn towards `chain_out` (when `burn_fee` is set) or Leg C
    fn host_multicall(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        burn_fee: Option<&TokenAmount>,
    ) -> Bytes {
        let mut calls = transit.calls();
        let trade = transit.trade();

        let (output_token, to) = match (burn_fee, leg_c) {
            (Some(fee), _) => {
                calls.push(
                    self.meta_burn(transit, leg_c, fee),
                    self.host.synthesis,
                    trade.token_out().address,
                    META_BURN_AMOUNT_OFFSET,
                );
                (trade.token_out().address, self.revertable_source)
            }
            (None, Some(leg_c)) => {
                calls.push(
                    leg_c.call_data.clone(),
                    leg_c.router_address,
                    leg_c.token_in().address,
                    leg_c.call_data_offset.unwrap_or_default(),
                );
                (leg_c.token_out().address, self.to)
            }
            (None, None) => (trade.token_out().address, self.to),
        };

        encode_multicall(trade.token_amount_in.raw, &calls, output_token, to)
    }

    fn host_final(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        burn_fee: Option<&TokenAmount>,
    ) -> FinalCall {
        FinalCall {
            receive_side: self.host.multicall_router,
            calldata: self.host_multicall(transit, leg_c, burn_fee),
            offset: MULTICALL_AMOUNT_OFFSET,
        }
    }

    /// `metaMintSyntheticToken` on the host, as relayed after a synthesize
    fn meta_mint(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        fee1: &TokenAmount,
        burn_fee: Option<&TokenAmount>,
    ) -> RelayedCall {
        let final_call = self.host_final(transit, leg_c, burn_fee);
        let deposit = transit.bridge_amount_in();
        let call = ISynthesis::metaMintSyntheticTokenCall {
            txn: ISynthesis::MetaMintTransaction {
                stableBridgingFee: fee1.raw,
                amount: deposit.raw,
                crossChainID: EMPTY_ID,
                externalID: external_id(
                    EMPTY_ID,
                    self.host.synthesis,
                    self.revertable_source,
                    self.host.id,
                ),
                tokenReal: deposit.token.address,
                chainID: U256::from(self.chain_in.id.as_u64()),
                to: self.host.multicall_router,
                swapTokens: Self::swap_tokens(transit),
                secondDexRouter: Address::ZERO,
                secondSwapCalldata: Bytes::new(),
                finalReceiveSide: final_call.receive_side,
                finalCalldata: final_call.calldata,
                finalOffset: U256::from(final_call.offset),
            },
        };
        RelayedCall {
            receive_side: self.host.synthesis,
            calldata: Bytes::from(call.abi_encode()),
        }
    }

    /// `metaSynthesize` on the source portal
    fn meta_synthesize(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        fee1: &TokenAmount,
        burn_fee: Option<&TokenAmount>,
    ) -> Bytes {
        let final_call = self.host_final(transit, leg_c, burn_fee);
        let deposit = transit.bridge_amount_in();
        let call = IPortal::metaSynthesizeCall {
            txn: IPortal::MetaSynthesizeTransaction {
                stableBridgingFee: fee1.raw,
                amount: deposit.raw,
                rtoken: deposit.token.address,
                chain2address: self.host.multicall_router,
                receiveSide: self.host.synthesis,
                oppositeBridge: self.host.bridge,
                syntCaller: self.from,
                chainID: U256::from(self.host.id.as_u64()),
                swapTokens: Self::swap_tokens(transit),
                secondDexRouter: Address::ZERO,
                secondSwapCalldata: Bytes::new(),
                finalReceiveSide: final_call.receive_side,
                finalCalldata: final_call.calldata,
                finalOffset: U256::from(final_call.offset),
                revertableAddress: self.revertable_source,
                clientID: self.client_id,
            },
        };
        Bytes::from(call.abi_encode())
    }

    /// Relayed calls to price: fee 1 always, fee 2 for v2. A missing fee 2
    /// is encoded as zero.
    pub fn relayed_calls(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        fee1: &TokenAmount,
        fee2: Option<&TokenAmount>,
    ) -> (RelayedCall, Option<RelayedCall>) {
        match self.direction {
            BridgeDirection::Mint => (self.meta_mint(transit, leg_c, fee1, None), None),
            BridgeDirection::Burn => (self.meta_unsynthesize(transit, leg_c, fee1), None),
            BridgeDirection::V2 => {
                let fee2 = fee2
                    .cloned()
                    .unwrap_or_else(|| provisional_fee(transit.token_out()));
                (
                    self.meta_mint(transit, leg_c, fee1, Some(&fee2)),
                    Some(self.meta_unsynthesize(transit, leg_c, &fee2)),
                )
            }
        }
    }

    /// Call the source meta router relays the deposit into
    pub fn source_call(
        &self,
        transit: &ReadyTransit,
        leg_c: Option<&TradeQuote>,
        fee1: &TokenAmount,
        fee2: Option<&TokenAmount>,
    ) -> SourceCall {
        match self.direction {
            BridgeDirection::Mint => SourceCall {
                relay_recipient: self.chain_in.portal,
                calldata: self.meta_synthesize(transit, leg_c, fee1, None),
            },
            BridgeDirection::Burn => SourceCall {
                relay_recipient: self.host.multicall_router,
                calldata: self.host_multicall(transit, leg_c, Some(fee1)),
            },
            BridgeDirection::V2 => {
                let fee2 = fee2
                    .cloned()
                    .unwrap_or_else(|| provisional_fee(transit.token_out()));
                SourceCall {
                    relay_recipient: self.chain_in.portal,
                    calldata: self.meta_synthesize(transit, leg_c, fee1, Some(&fee2)),
                }
            }
        }
    }
}

/// Zero-valued provisional fee in `token`
pub fn provisional_fee(token: &Token) -> TokenAmount {
    TokenAmount::zero(token.clone())
}
