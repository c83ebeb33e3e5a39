//! Volume fee collectors
//!
//! A collector skims a proportional fee from the omnipool output on the host
//! chain. It applies only when every chain of the route is eligible and the
//! pool's asset is not excluded.

use alloy_primitives::{Address, U256};
use omni_core::{ChainId, ConfigError};
use serde::{Deserialize, Serialize};

/// One deployed fee collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCollector {
    pub chain_id: ChainId,
    pub address: Address,
    /// Fee rate scaled by 1e18
    pub fee_rate: U256,
    pub eligible_chains: Vec<ChainId>,
    /// Pool assets (by CoinGecko id) exempt from the fee
    #[serde(default)]
    pub excluded_coin_gecko_ids: Vec<String>,
}

impl FeeCollector {
    pub fn applies_to(&self, chains: &[ChainId], coin_gecko_id: &str) -> bool {
        chains.iter().all(|c| self.eligible_chains.contains(c))
            && !self
                .excluded_coin_gecko_ids
                .iter()
                .any(|id| id == coin_gecko_id)
    }
}

/// Registry of fee collectors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeCollectorRegistry {
    pub collectors: Vec<FeeCollector>,
}

impl FeeCollectorRegistry {
    pub fn new(collectors: Vec<FeeCollector>) -> Self {
        Self { collectors }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Collector on `host_chain` covering `involved_chains` for `coin_gecko_id`
    pub fn find(
        &self,
        host_chain: ChainId,
        involved_chains: &[ChainId],
        coin_gecko_id: &str,
    ) -> Option<&FeeCollector> {
        self.collectors
            .iter()
            .find(|c| c.chain_id == host_chain && c.applies_to(involved_chains, coin_gecko_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FeeCollectorRegistry {
        FeeCollectorRegistry::new(vec![FeeCollector {
            chain_id: ChainId(56),
            address: Address::repeat_byte(0xfc),
            fee_rate: U256::from(1_000_000_000_000_000u64),
            eligible_chains: vec![ChainId(1), ChainId(56), ChainId(43114)],
            excluded_coin_gecko_ids: vec!["ethereum".to_string()],
        }])
    }

    #[test]
    fn test_find_eligible() {
        let registry = registry();
        assert!(registry
            .find(ChainId(56), &[ChainId(1), ChainId(56)], "usd-coin")
            .is_some());
    }

    #[test]
    fn test_ineligible_chain_or_asset() {
        let registry = registry();
        assert!(registry
            .find(ChainId(56), &[ChainId(137), ChainId(56)], "usd-coin")
            .is_none());
        assert!(registry
            .find(ChainId(56), &[ChainId(1), ChainId(56)], "ethereum")
            .is_none());
        assert!(registry
            .find(ChainId(1), &[ChainId(1), ChainId(56)], "usd-coin")
            .is_none());
    }

    #[test]
    fn test_registry_from_json() {
        let json = r#"[{
            "chainId": 56,
            "address": "0xfcfcfcfcfcfcfcfcfcfcfcfcfcfcfcfcfcfcfcfc",
            "feeRate": "0x38d7ea4c68000",
            "eligibleChains": [1, 56]
        }]"#;
        let registry = FeeCollectorRegistry::from_json_str(json).unwrap();
        let collector = registry
            .find(ChainId(56), &[ChainId(1)], "usd-coin")
            .unwrap();
        assert_eq!(collector.fee_rate, U256::from(1_000_000_000_000_000u64));
    }
}
