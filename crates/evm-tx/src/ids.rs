//! Bridging request identifiers

use alloy_primitives::{keccak256, Address, B256, U256};
use omni_core::ChainId;

/// Placeholder id used when the real request id is assigned on chain
pub const EMPTY_ID: B256 = B256::ZERO;

/// `keccak256(abi.encodePacked(internalId, receiveSide, revertableAddress, chainId))`
pub fn external_id(
    internal_id: B256,
    receive_side: Address,
    revertable_address: Address,
    chain_id: ChainId,
) -> B256 {
    let mut packed = Vec::with_capacity(32 + 20 + 20 + 32);
    packed.extend_from_slice(internal_id.as_slice());
    packed.extend_from_slice(receive_side.as_slice());
    packed.extend_from_slice(revertable_address.as_slice());
    packed.extend_from_slice(&U256::from(chain_id.0).to_be_bytes::<32>());
    keccak256(packed)
}
