//! Omnipool Calculator
//!
//! Slippage, volume fee and price impact math over raw `U256` amounts.

use alloy_primitives::U256;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use omni_core::math::mul_div;
use omni_core::{AmountError, SlippageBps};

use crate::constants::{BPS_DENOM, FEE_RATE_SCALE};

/// Apply slippage tolerance: `amount * (10000 - bps) / 10000`
pub fn apply_slippage(amount: U256, slippage_bps: SlippageBps) -> Result<U256, AmountError> {
    let keep = BPS_DENOM.saturating_sub(slippage_bps);
    mul_div(amount, U256::from(keep), U256::from(BPS_DENOM))
}

/// Worst-case output of a swap.
///
/// The quoted output is first scaled to the worst-case input
/// (`amount_in_min / amount_in`), then reduced by the slippage tolerance.
pub fn min_amount_out(
    amount_out: U256,
    amount_in: U256,
    amount_in_min: U256,
    slippage_bps: SlippageBps,
) -> Result<U256, AmountError> {
    let scaled = if amount_in.is_zero() || amount_in_min >= amount_in {
        amount_out
    } else {
        mul_div(amount_out, amount_in_min, amount_in)?
    };
    apply_slippage(scaled, slippage_bps)
}

/// Amount left after the volume fee: `amount - amount * fee_rate / 1e18`
pub fn skim_volume_fee(amount: U256, fee_rate: U256) -> Result<U256, AmountError> {
    let fee = mul_div(amount, fee_rate, U256::from(FEE_RATE_SCALE))?;
    amount.checked_sub(fee).ok_or_else(|| AmountError::Underflow {
        amount: amount.to_string(),
        subtrahend: fee.to_string(),
    })
}

fn to_f64(value: U256) -> f64 {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
        .to_f64()
        .unwrap_or(f64::MAX)
}

/// Execution rate `amount_out / amount_in`
pub fn calculate_effective_rate(amount_in: U256, amount_out: U256) -> f64 {
    if amount_in.is_zero() {
        return 0.0;
    }
    to_f64(amount_out) / to_f64(amount_in)
}

/// Calculate price impact as percentage.
///
/// The spot rate is taken from a small reference quote of the same pool
/// direction; impact is the relative gap between it and the execution rate.
pub fn calculate_price_impact(
    amount_in: U256,
    amount_out: U256,
    reference_in: U256,
    reference_out: U256,
) -> f64 {
    if amount_in.is_zero() || amount_out.is_zero() {
        return 0.0;
    }

    let spot_rate = calculate_effective_rate(reference_in, reference_out);
    if spot_rate == 0.0 {
        return 0.0;
    }
    let execution_rate = calculate_effective_rate(amount_in, amount_out);

    (((spot_rate - execution_rate) / spot_rate).abs() * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e18(v: u64) -> U256 {
        U256::from(v) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_apply_slippage() {
        assert_eq!(apply_slippage(U256::from(10_000u64), 100).unwrap(), U256::from(9_900u64));
        assert_eq!(apply_slippage(U256::from(10_000u64), 0).unwrap(), U256::from(10_000u64));
        // Tolerance above 100% floors at zero
        assert_eq!(apply_slippage(U256::from(10_000u64), 20_000).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_min_amount_out_worst_case_input() {
        // 80e18 * 0.9 * 0.99
        let min = min_amount_out(e18(80), U256::from(100u64), U256::from(90u64), 100).unwrap();
        assert_eq!(min, U256::from(71_280_000_000_000_000_000u128));
    }

    #[test]
    fn test_min_amount_out_never_exceeds_output() {
        let min = min_amount_out(e18(80), U256::from(100u64), U256::from(150u64), 0).unwrap();
        assert_eq!(min, e18(80));
    }

    #[test]
    fn test_skim_volume_fee() {
        // 0.1% fee rate
        let rate = U256::from(1_000_000_000_000_000u64);
        assert_eq!(skim_volume_fee(e18(1000), rate).unwrap(), e18(999));
        assert_eq!(skim_volume_fee(e18(1000), U256::ZERO).unwrap(), e18(1000));
        assert!(skim_volume_fee(e18(1), e18(2)).is_err());
    }

    #[test]
    fn test_price_impact() {
        // Linear pool: no impact
        let impact = calculate_price_impact(e18(100), e18(80), e18(1), U256::from(800_000_000_000_000_000u64));
        assert!(impact.abs() < 1e-9);

        // Execution 0.72 vs spot 0.8 = 10%
        let impact = calculate_price_impact(e18(100), e18(72), e18(1), U256::from(800_000_000_000_000_000u64));
        assert!((impact - 10.0).abs() < 1e-9);

        assert_eq!(calculate_price_impact(U256::ZERO, e18(1), e18(1), e18(1)), 0.0);
    }
}
