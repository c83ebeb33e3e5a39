//! advisor-client: HTTP client for the bridging fee advisor
//!
//! The advisor prices the relayer's destination-side call. Every request is
//! bounded by the configured timeout; there are no retries.

pub mod fee;

use std::time::Duration;

use async_trait::async_trait;
use omni_core::{AdvisorConfig, Error, ExternalServiceError, Result};

pub use fee::{parse_fee_response, BridgeFee, BridgeFeeRequest, FeeEstimator};

/// Fee advisor endpoint path
pub const BRIDGE_FEE_PATH: &str = "/v1/swap/price";

/// HTTP fee advisor client
#[derive(Debug, Clone)]
pub struct AdvisorClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl AdvisorClient {
    pub fn new(config: &AdvisorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("omniroute")
            .build()
            .map_err(|e| ExternalServiceError::Malformed {
                service: "advisor".to_string(),
                message: format!("cannot build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, BRIDGE_FEE_PATH)
    }

    async fn post_fee_request(
        &self,
        request: &BridgeFeeRequest,
    ) -> std::result::Result<String, String> {
        let response = self
            .http
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("HTTP {}: {}", status, body));
        }
        Ok(body)
    }
}

#[async_trait]
impl FeeEstimator for AdvisorClient {
    async fn bridge_fee(&self, request: &BridgeFeeRequest) -> Result<BridgeFee> {
        let outcome = timed_request(self.timeout, self.post_fee_request(request)).await;
        let fee = fee_from_outcome(request, outcome)?;
        tracing::debug!(
            chain_from = %request.chain_id_from,
            chain_to = %request.chain_id_to,
            price = %fee.price,
            "Fetched bridging fee"
        );
        Ok(fee)
    }
}

/// Resolve an advisor round trip into a fee. Transport failures, timeouts and
/// unparsable bodies all surface as a fee-estimate error for the hop.
fn fee_from_outcome(
    request: &BridgeFeeRequest,
    outcome: std::result::Result<std::result::Result<String, String>, ExternalServiceError>,
) -> Result<BridgeFee> {
    let body = match outcome {
        Ok(Ok(body)) => body,
        Ok(Err(message)) => return Err(fee_estimate_error(request, message).into()),
        Err(timeout) => return Err(fee_estimate_error(request, timeout.to_string()).into()),
    };
    parse_fee_response(&body).map_err(|e| {
        let message = match e {
            Error::External(inner) => inner.to_string(),
            other => other.to_string(),
        };
        fee_estimate_error(request, message).into()
    })
}

fn fee_estimate_error(request: &BridgeFeeRequest, message: String) -> ExternalServiceError {
    tracing::warn!(
        chain_from = %request.chain_id_from,
        chain_to = %request.chain_id_to,
        receive_side = %request.receive_side,
        "Advisor fee request failed: {}",
        message
    );
    ExternalServiceError::FeeEstimate {
        chain_from: request.chain_id_from,
        chain_to: request.chain_id_to,
        receive_side: request.receive_side,
        message,
    }
}

/// Bound an advisor call with `timeout`
async fn timed_request<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = T>,
) -> std::result::Result<T, ExternalServiceError> {
    tokio::time::timeout(timeout, fut).await.map_err(|_| {
        tracing::warn!("Advisor request timed out after {}s", timeout.as_secs());
        ExternalServiceError::Timeout {
            service: "advisor".to_string(),
            seconds: timeout.as_secs(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, U256};
    use omni_core::ChainId;

    fn request() -> BridgeFeeRequest {
        BridgeFeeRequest {
            chain_id_from: ChainId(1),
            chain_id_to: ChainId(56),
            receive_side: Address::repeat_byte(0x22),
            call_data: Bytes::from(vec![0xde, 0xad]),
            client_id: String::new(),
        }
    }

    fn assert_hop_error(err: Error, detail: &str) {
        assert_eq!(err.error_code(), "fee_estimate_failed");
        let text = err.to_string();
        assert!(text.contains("1 -> 56"), "{}", text);
        assert!(
            text.contains(&Address::repeat_byte(0x22).to_string()),
            "{}",
            text
        );
        assert!(text.contains(detail), "{}", text);
    }

    #[test]
    fn test_timeout_names_the_hop() {
        let timeout = ExternalServiceError::Timeout {
            service: "advisor".to_string(),
            seconds: 5,
        };
        let err = fee_from_outcome(&request(), Err(timeout)).unwrap_err();
        assert_hop_error(err, "timed out after 5s");
    }

    #[test]
    fn test_malformed_body_names_the_hop() {
        let err = fee_from_outcome(&request(), Ok(Ok("not json".to_string()))).unwrap_err();
        assert_hop_error(err, "Malformed response");
    }

    #[test]
    fn test_transport_failure_names_the_hop() {
        let err = fee_from_outcome(&request(), Ok(Err("HTTP 502: bad gateway".to_string())))
            .unwrap_err();
        assert_hop_error(err, "HTTP 502");
    }

    #[test]
    fn test_fee_from_good_body() {
        let body = r#"{"price":"1500","save":"0"}"#.to_string();
        let fee = fee_from_outcome(&request(), Ok(Ok(body))).unwrap();
        assert_eq!(fee.price, U256::from(1500u64));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = AdvisorConfig {
            url: "http://advisor.local/".to_string(),
            timeout_secs: 5,
        };
        let client = AdvisorClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://advisor.local/v1/swap/price");
    }

    #[tokio::test]
    async fn test_timed_request_times_out() {
        let result = timed_request(
            Duration::from_millis(10),
            std::future::pending::<()>(),
        )
        .await;
        assert!(matches!(
            result,
            Err(ExternalServiceError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_timed_request_passes_value_through() {
        let result = timed_request(Duration::from_secs(1), async { 42 }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
