//! Calldata patch points
//!
//! A patch point is the byte offset where a 32-byte big-endian amount word
//! begins inside ABI-encoded calldata. Relayer contracts overwrite that word
//! with the amount actually realised upstream; off-chain code rewrites it when
//! repricing a quote. Patching never changes the calldata length, so an offset
//! stays valid for the lifetime of the calldata shape.

use alloy_primitives::{Bytes, U256};

use crate::CalldataError;

/// Size of one ABI word
pub const WORD_SIZE: usize = 32;

/// Length of a function selector
pub const SELECTOR_SIZE: usize = 4;

/// Offset of the `index`-th static head parameter of a call
pub const fn param_offset(index: usize) -> usize {
    SELECTOR_SIZE + WORD_SIZE * index
}

/// Offset of the `index`-th static field of a dynamic struct passed as the
/// sole argument of a call (head holds one pointer word, then the tuple).
pub const fn struct_field_offset(index: usize) -> usize {
    SELECTOR_SIZE + WORD_SIZE + WORD_SIZE * index
}

fn check_bounds(calldata: &[u8], offset: usize) -> Result<(), CalldataError> {
    match offset.checked_add(WORD_SIZE) {
        Some(end) if end <= calldata.len() => Ok(()),
        _ => Err(CalldataError::OffsetOutOfBounds {
            offset,
            len: calldata.len(),
        }),
    }
}

/// Read the amount word at `offset`
pub fn read_word(calldata: &[u8], offset: usize) -> Result<U256, CalldataError> {
    check_bounds(calldata, offset)?;
    Ok(U256::from_be_slice(&calldata[offset..offset + WORD_SIZE]))
}

/// Return a copy of `calldata` with the word at `offset` replaced by `value`
pub fn patch_word(calldata: &[u8], offset: usize, value: U256) -> Result<Bytes, CalldataError> {
    check_bounds(calldata, offset)?;
    let mut patched = calldata.to_vec();
    patched[offset..offset + WORD_SIZE].copy_from_slice(&value.to_be_bytes::<32>());
    Ok(Bytes::from(patched))
}
