//! Overflow-free amount arithmetic
//!
//! Intermediate products are computed in `BigUint` so `a * b / c` never
//! overflows 256 bits before the division.

use alloy_primitives::U256;
use num_bigint::BigUint;

use crate::AmountError;

fn to_big(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

fn from_big(value: &BigUint) -> Option<U256> {
    U256::try_from_be_slice(&value.to_bytes_be())
}

/// `value * numerator / denominator`, rounded down
pub fn mul_div(value: U256, numerator: U256, denominator: U256) -> Result<U256, AmountError> {
    if denominator.is_zero() {
        return Err(AmountError::Overflow(format!(
            "{} * {} / 0",
            value, numerator
        )));
    }

    let result = to_big(value) * to_big(numerator) / to_big(denominator);
    from_big(&result).ok_or_else(|| {
        AmountError::Overflow(format!("{} * {} / {}", value, numerator, denominator))
    })
}
