//! Token representations across chains
//!
//! Each bridged asset has one original token and a synthetic representation
//! on every chain it can be minted to. Loaded from a JSON list of
//! `{ "original": Token, "synthetics": [Token] }` entries.

use omni_core::{ChainId, ConfigError, OmniPoolConfig, Token};
use serde::{Deserialize, Serialize};

/// Resolves a token's counterpart on another chain
pub trait RepresentationLookup: Send + Sync {
    fn representation(&self, token: &Token, chain_id: ChainId) -> Option<Token>;
}

/// One bridged asset and its synthetics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepresentationEntry {
    pub original: Token,
    #[serde(default)]
    pub synthetics: Vec<Token>,
}

impl RepresentationEntry {
    fn contains(&self, token: &Token) -> bool {
        self.original == *token || self.synthetics.iter().any(|s| s == token)
    }
}

/// Static representation table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepresentationTable {
    pub entries: Vec<RepresentationEntry>,
}

impl RepresentationTable {
    pub fn new(entries: Vec<RepresentationEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl RepresentationLookup for RepresentationTable {
    fn representation(&self, token: &Token, chain_id: ChainId) -> Option<Token> {
        let entry = self.entries.iter().find(|e| e.contains(token))?;
        if entry.original.chain_id == chain_id {
            return Some(entry.original.clone());
        }
        entry
            .synthetics
            .iter()
            .find(|s| s.chain_id == chain_id)
            .cloned()
    }
}

/// Token a route must hold on `chain_id` to enter or leave `pool`.
///
/// On the host this is the pool asset native to the host. Elsewhere it is the
/// original token behind the pool asset minted from that chain.
pub fn transit_token(
    lookup: &dyn RepresentationLookup,
    pool: &OmniPoolConfig,
    chain_id: ChainId,
) -> Result<Token, ConfigError> {
    let missing = || ConfigError::MissingRepresentation {
        token: format!("omnipool {} asset", pool.coin_gecko_id),
        chain_id,
    };

    if chain_id == pool.chain_id {
        return pool
            .assets
            .iter()
            .find(|asset| !asset.is_synthetic())
            .cloned()
            .ok_or_else(missing);
    }

    let asset = pool
        .assets
        .iter()
        .find(|asset| asset.chain_from_id == Some(chain_id))
        .ok_or_else(missing)?;
    lookup.representation(asset, chain_id).ok_or_else(missing)
}

/// Representation of `token` on `chain_id`, or a configuration error
pub fn require_representation(
    lookup: &dyn RepresentationLookup,
    token: &Token,
    chain_id: ChainId,
) -> Result<Token, ConfigError> {
    if token.chain_id == chain_id {
        return Ok(token.clone());
    }
    lookup
        .representation(token, chain_id)
        .ok_or_else(|| ConfigError::MissingRepresentation {
            token: token.to_string(),
            chain_id,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    const ETH: ChainId = ChainId(1);
    const BSC: ChainId = ChainId(56);
    const AVAX: ChainId = ChainId(43114);

    fn usdc_eth() -> Token {
        Token::new(ETH, Address::repeat_byte(0x01), 6, "USDC")
    }

    fn s_usdc_eth_on_bsc() -> Token {
        Token::new(BSC, Address::repeat_byte(0x11), 6, "sUSDC").synthetic_of(ETH)
    }

    fn usdc_bsc() -> Token {
        Token::new(BSC, Address::repeat_byte(0x02), 18, "USDC")
    }

    fn table() -> RepresentationTable {
        RepresentationTable::new(vec![RepresentationEntry {
            original: usdc_eth(),
            synthetics: vec![s_usdc_eth_on_bsc()],
        }])
    }

    fn pool() -> OmniPoolConfig {
        OmniPoolConfig {
            chain_id: BSC,
            address: Address::repeat_byte(0xb0),
            coin_gecko_id: "usd-coin".to_string(),
            assets: vec![usdc_bsc(), s_usdc_eth_on_bsc()],
        }
    }

    #[test]
    fn test_lookup_both_ways() {
        let table = table();
        assert_eq!(table.representation(&usdc_eth(), BSC), Some(s_usdc_eth_on_bsc()));
        assert_eq!(table.representation(&s_usdc_eth_on_bsc(), ETH), Some(usdc_eth()));
        assert_eq!(table.representation(&usdc_eth(), AVAX), None);
    }

    #[test]
    fn test_transit_tokens() {
        let table = table();
        assert_eq!(transit_token(&table, &pool(), BSC).unwrap(), usdc_bsc());
        assert_eq!(transit_token(&table, &pool(), ETH).unwrap(), usdc_eth());
        assert!(matches!(
            transit_token(&table, &pool(), AVAX),
            Err(ConfigError::MissingRepresentation { .. })
        ));
    }

    #[test]
    fn test_require_representation_same_chain() {
        let table = RepresentationTable::default();
        assert_eq!(
            require_representation(&table, &usdc_bsc(), BSC).unwrap(),
            usdc_bsc()
        );
        assert!(require_representation(&table, &usdc_bsc(), ETH).is_err());
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"[{
            "original": {
                "chainId": 1,
                "address": "0x0101010101010101010101010101010101010101",
                "decimals": 6,
                "symbol": "USDC"
            },
            "synthetics": [{
                "chainId": 56,
                "address": "0x1111111111111111111111111111111111111111",
                "decimals": 6,
                "symbol": "sUSDC",
                "chainFromId": 1
            }]
        }]"#;
        let table = RepresentationTable::from_json_str(json).unwrap();
        let synthetic = table.representation(&usdc_eth(), BSC).unwrap();
        assert!(synthetic.is_synthetic());
        assert_eq!(synthetic.chain_from_id, Some(ETH));
    }
}
