//! Bridging fee request/response types and the estimator seam

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use omni_core::{ChainId, ExternalServiceError, Result, Token, TokenAmount};
use serde::{Deserialize, Serialize};

/// Fee quote for one bridging hop.
///
/// The advisor prices the destination-side call it will relay, so the request
/// carries that call's target and calldata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeFeeRequest {
    pub chain_id_from: ChainId,
    pub chain_id_to: ChainId,
    /// Contract the relayer calls on `chain_id_to`
    pub receive_side: Address,
    pub call_data: Bytes,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_id: String,
}

/// Bridging fee in units of the fee token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeFee {
    pub price: U256,
    /// Amount saved versus the undiscounted fee, reporting only
    pub save: U256,
}

impl BridgeFee {
    pub fn to_amount(&self, token: &Token) -> TokenAmount {
        TokenAmount::new(token.clone(), self.price)
    }
}

/// Source of bridging fees
#[async_trait]
pub trait FeeEstimator: Send + Sync {
    async fn bridge_fee(&self, request: &BridgeFeeRequest) -> Result<BridgeFee>;
}

/// Advisor response body. Amounts arrive as decimal strings or JSON numbers.
#[derive(Debug, Deserialize)]
struct FeeResponse {
    price: serde_json::Value,
    #[serde(default)]
    save: Option<serde_json::Value>,
}

fn parse_amount(field: &str, value: &serde_json::Value) -> std::result::Result<U256, String> {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) if n.is_u64() => n.to_string(),
        other => return Err(format!("{} is not an unsigned integer: {}", field, other)),
    };
    text.parse::<U256>()
        .map_err(|e| format!("{} '{}' is not a valid amount: {}", field, text, e))
}

/// Parse an advisor response body into a [`BridgeFee`]
pub fn parse_fee_response(body: &str) -> Result<BridgeFee> {
    let malformed = |message: String| ExternalServiceError::Malformed {
        service: "advisor".to_string(),
        message,
    };

    let response: FeeResponse = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let price = parse_amount("price", &response.price).map_err(malformed)?;
    let save = match response.save {
        Some(ref value) if !value.is_null() => parse_amount("save", value).map_err(malformed)?,
        _ => U256::ZERO,
    };

    Ok(BridgeFee { price, save })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_amounts() {
        let fee = parse_fee_response(r#"{"price":"1500000000000000000","save":"0"}"#).unwrap();
        assert_eq!(fee.price, U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(fee.save, U256::ZERO);
    }

    #[test]
    fn test_parse_numeric_amounts_and_missing_save() {
        let fee = parse_fee_response(r#"{"price":2500}"#).unwrap();
        assert_eq!(fee.price, U256::from(2500u64));
        assert_eq!(fee.save, U256::ZERO);
    }

    #[test]
    fn test_parse_malformed() {
        for body in [
            r#"{"save":"1"}"#,
            r#"{"price":"-5"}"#,
            r#"{"price":"abc"}"#,
            r#"{"price":1.5}"#,
            "not json",
        ] {
            let err = parse_fee_response(body).unwrap_err();
            assert_eq!(err.error_code(), "malformed_response", "body: {}", body);
        }
    }

    #[test]
    fn test_request_wire_format() {
        let request = BridgeFeeRequest {
            chain_id_from: ChainId(1),
            chain_id_to: ChainId(56),
            receive_side: Address::repeat_byte(0x22),
            call_data: Bytes::from(vec![0xde, 0xad]),
            client_id: String::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chain_id_from"], 1);
        assert_eq!(json["chain_id_to"], 56);
        assert_eq!(json["call_data"], "0xdead");
        assert!(json.get("client_id").is_none());
    }
}
