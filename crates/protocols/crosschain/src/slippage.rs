//! Slippage split across route legs

use omni_core::{AmountError, SlippageBps};
use serde::{Deserialize, Serialize};

use crate::constants::slippage::{MIN_LEG_SLIPPAGE_BPS, TRANSIT_SLIPPAGE_BPS};

/// Per-leg slippage allocation in bps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlippageSplit {
    pub a: SlippageBps,
    pub b: SlippageBps,
    pub c: SlippageBps,
}

/// Splits a route's total slippage tolerance over its active legs
pub trait SlippageSplitter: Send + Sync {
    fn split(
        &self,
        total: SlippageBps,
        has_leg_a: bool,
        has_leg_c: bool,
    ) -> Result<SlippageSplit, AmountError>;
}

/// Default split.
///
/// The bridging pool swap trades like-for-like assets, so it keeps a fixed
/// small share; the DEX legs split the remainder evenly. Every active leg gets
/// at least [`MIN_LEG_SLIPPAGE_BPS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedSlippageSplit;

impl SlippageSplitter for WeightedSlippageSplit {
    fn split(
        &self,
        total: SlippageBps,
        has_leg_a: bool,
        has_leg_c: bool,
    ) -> Result<SlippageSplit, AmountError> {
        let legs = 1 + u32::from(has_leg_a) + u32::from(has_leg_c);
        if total < MIN_LEG_SLIPPAGE_BPS * legs {
            return Err(AmountError::TooLow {
                amount: format!("{} bps", total),
                reason: format!(
                    "slippage must be at least {} bps for {} legs",
                    MIN_LEG_SLIPPAGE_BPS * legs,
                    legs
                ),
            });
        }

        if legs == 1 {
            return Ok(SlippageSplit {
                a: 0,
                b: total,
                c: 0,
            });
        }

        let b = TRANSIT_SLIPPAGE_BPS.max(MIN_LEG_SLIPPAGE_BPS);
        let rest = total - b;
        let split = match (has_leg_a, has_leg_c) {
            (true, true) => {
                let a = rest / 2;
                SlippageSplit { a, b, c: rest - a }
            }
            (true, false) => SlippageSplit { a: rest, b, c: 0 },
            _ => SlippageSplit { a: 0, b, c: rest },
        };
        Ok(split)
    }
}
