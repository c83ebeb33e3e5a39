//! Configuration types for Omniroute

use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{ChainId, ConfigError, Token};

/// Fee advisor connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Advisor base URL (e.g., "http://127.0.0.1:8080")
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_advisor_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_advisor_timeout_secs() -> u64 {
    30
}

impl AdvisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: default_advisor_timeout_secs(),
        }
    }
}

/// Ordered chain priority consumed by the direction resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainPriority(pub Vec<ChainId>);

impl ChainPriority {
    pub fn new(chains: impl IntoIterator<Item = ChainId>) -> Self {
        Self(chains.into_iter().collect())
    }

    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.0.contains(&chain_id)
    }

    /// Priority order with `host` moved to the end
    pub fn with_host_last(&self, host: ChainId) -> Vec<ChainId> {
        let mut ordering: Vec<ChainId> = self.0.iter().copied().filter(|c| *c != host).collect();
        ordering.push(host);
        ordering
    }
}

/// Transaction encoding family of a chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    #[default]
    Evm,
    Tron,
    Ton,
}

impl ChainKind {
    /// Chains whose refunds must be routed to an explicitly supplied address
    pub fn requires_explicit_refund(&self) -> bool {
        matches!(self, Self::Tron | Self::Ton)
    }
}

/// Contract addresses deployed on one chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub id: ChainId,
    #[serde(default)]
    pub kind: ChainKind,
    pub meta_router: Address,
    /// Spender the user approves (pulls tokens into the meta router)
    pub meta_router_gateway: Address,
    pub multicall_router: Address,
    pub portal: Address,
    pub synthesis: Address,
    pub bridge: Address,
}

/// Shared liquidity pool used for bridging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmniPoolConfig {
    /// Host chain the pool lives on
    pub chain_id: ChainId,
    pub address: Address,
    pub coin_gecko_id: String,
    /// Pool assets on the host chain, in pool index order
    #[serde(default)]
    pub assets: Vec<Token>,
}

impl OmniPoolConfig {
    /// Pool index of `token`
    pub fn asset_index(&self, token: &Token) -> Result<u8, ConfigError> {
        let index = self
            .assets
            .iter()
            .position(|asset| asset == token)
            .ok_or_else(|| ConfigError::UnknownPoolAsset {
                token: token.to_string(),
                pool: self.address,
            })?;
        u8::try_from(index)
            .map_err(|_| ConfigError::Invalid(format!("pool {} has too many assets", self.address)))
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Fee advisor settings
    #[serde(default)]
    pub advisor: AdvisorConfig,

    /// Direction resolver chain order
    #[serde(default)]
    pub chain_priority: ChainPriority,

    /// Per-chain contract addresses
    #[serde(default)]
    pub chains: Vec<ChainConfig>,

    /// Omnipools available for bridging
    #[serde(default)]
    pub omni_pools: Vec<OmniPoolConfig>,

    /// Client identifier embedded in bridging calls
    #[serde(default)]
    pub client_id: String,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Contract addresses for `chain_id`
    pub fn chain(&self, chain_id: ChainId) -> Result<&ChainConfig, ConfigError> {
        self.chains
            .iter()
            .find(|c| c.id == chain_id)
            .ok_or(ConfigError::MissingChainConfig { chain_id })
    }
}
