//! Bridging direction
//!
//! The omnipool lives on one host chain. Moving value onto the host mints
//! synthetics, moving it off burns them, and a route between two non-host
//! chains passes through the host without either (v2).

use std::fmt;

use omni_core::{ChainId, ChainPriority, ConfigError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeDirection {
    Mint,
    Burn,
    V2,
}

impl fmt::Display for BridgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint => write!(f, "mint"),
            Self::Burn => write!(f, "burn"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

/// Resolve the bridging direction between `chain_in` and `chain_out`.
///
/// With the host on neither side the route is v2. Otherwise both chains are
/// ranked in `priority` with the host moved last, and the route burns when the
/// input ranks after the output.
pub fn get_direction(
    chain_in: ChainId,
    chain_out: ChainId,
    host: ChainId,
    priority: &ChainPriority,
) -> Result<BridgeDirection, ConfigError> {
    if chain_in != host && chain_out != host {
        return Ok(BridgeDirection::V2);
    }

    let ordering = priority.with_host_last(host);
    let index_of = |chain_id: ChainId| {
        if chain_id != host && !priority.contains(chain_id) {
            return Err(ConfigError::UnknownChain { chain_id });
        }
        ordering
            .iter()
            .position(|c| *c == chain_id)
            .ok_or(ConfigError::UnknownChain { chain_id })
    };

    let i = index_of(chain_in)?;
    let o = index_of(chain_out)?;
    Ok(if i > o {
        BridgeDirection::Burn
    } else {
        BridgeDirection::Mint
    })
}
