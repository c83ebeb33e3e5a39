//! Omnipool quoting
//!
//! [`PoolQuoter`] is the seam the pool trade quotes through. [`RpcPoolQuoter`]
//! answers it with an `eth_call` of the pool's `quote` view on the host chain.

use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use evm_tx::contracts::IOctoPool;
use omni_core::calldata::read_word;
use omni_core::{ChainId, ConfigError, ExternalServiceError, OmniPoolConfig, Result};
use serde::Deserialize;

use crate::constants::{providers, RPC_REQUEST_TIMEOUT_SECS};

/// Source of omnipool swap quotes
#[async_trait]
pub trait PoolQuoter: Send + Sync {
    /// Output of swapping `amount` of asset `index_in` into asset `index_out`
    async fn calculate_swap(
        &self,
        pool: &OmniPoolConfig,
        index_in: u8,
        index_out: u8,
        amount: U256,
    ) -> Result<U256>;
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Quotes omnipools through JSON-RPC `eth_call`
#[derive(Debug, Clone)]
pub struct RpcPoolQuoter {
    http: reqwest::Client,
    rpc_urls: HashMap<ChainId, String>,
    timeout: Duration,
}

impl RpcPoolQuoter {
    pub fn new(rpc_urls: HashMap<ChainId, String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_urls,
            timeout: Duration::from_secs(RPC_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn eth_call(&self, url: &str, to: Address, data: Bytes) -> std::result::Result<String, String> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": to, "data": data }, "latest"],
        });

        let response: RpcResponse = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        if let Some(error) = response.error {
            return Err(error.message);
        }
        response
            .result
            .ok_or_else(|| "eth_call returned neither result nor error".to_string())
    }
}

/// Decode the single `uint256` returned by the pool's `quote`
pub fn decode_quote_result(result: &str) -> Result<U256> {
    let malformed = |message: String| ExternalServiceError::Malformed {
        service: providers::OCTOPOOL.to_string(),
        message,
    };
    let bytes: Bytes = result
        .parse()
        .map_err(|e| malformed(format!("invalid hex '{}': {}", result, e)))?;
    read_word(&bytes, 0).map_err(|e| malformed(e.to_string()).into())
}

#[async_trait]
impl PoolQuoter for RpcPoolQuoter {
    async fn calculate_swap(
        &self,
        pool: &OmniPoolConfig,
        index_in: u8,
        index_out: u8,
        amount: U256,
    ) -> Result<U256> {
        let url = self
            .rpc_urls
            .get(&pool.chain_id)
            .ok_or_else(|| ConfigError::Invalid(format!("no RPC URL for chain {}", pool.chain_id)))?;

        let data = Bytes::from(
            IOctoPool::quoteCall {
                indexIn: U256::from(index_in),
                indexOut: U256::from(index_out),
                amount,
            }
            .abi_encode(),
        );

        let result = tokio::time::timeout(self.timeout, self.eth_call(url, pool.address, data))
            .await
            .map_err(|_| ExternalServiceError::Timeout {
                service: providers::OCTOPOOL.to_string(),
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|message| {
                tracing::warn!(
                    pool = %pool.address,
                    chain_id = %pool.chain_id,
                    "Omnipool quote failed: {}",
                    message
                );
                ExternalServiceError::Quote {
                    provider: providers::OCTOPOOL.to_string(),
                    message,
                }
            })?;

        decode_quote_result(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_quote_result() {
        let hex = format!("0x{:064x}", 80u64);
        assert_eq!(decode_quote_result(&hex).unwrap(), U256::from(80u64));
    }

    #[test]
    fn test_decode_short_result() {
        let err = decode_quote_result("0x1234").unwrap_err();
        assert_eq!(err.error_code(), "malformed_response");
        let err = decode_quote_result("0xzz").unwrap_err();
        assert_eq!(err.error_code(), "malformed_response");
    }

    #[tokio::test]
    async fn test_missing_rpc_url() {
        let quoter = RpcPoolQuoter::new(HashMap::new());
        let pool = OmniPoolConfig {
            chain_id: ChainId(56),
            address: Address::repeat_byte(1),
            coin_gecko_id: "usdc".to_string(),
            assets: vec![],
        };
        let err = quoter
            .calculate_swap(&pool, 0, 1, U256::from(1u64))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "invalid_config");
    }
}
