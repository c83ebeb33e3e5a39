//! Error types for Omniroute

use alloy_primitives::Address;
use thiserror::Error;

use crate::ChainId;

/// Core errors that can occur while composing a swap
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("External service error: {0}")]
    External(#[from] ExternalServiceError),

    #[error("Calldata error: {0}")]
    Calldata(#[from] CalldataError),
}

/// Static configuration is missing or inconsistent
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No representation of {token} on chain {chain_id}")]
    MissingRepresentation { token: String, chain_id: ChainId },

    #[error("Chain {chain_id} is not in the chain priority list")]
    UnknownChain { chain_id: ChainId },

    #[error("No contract config for chain {chain_id}")]
    MissingChainConfig { chain_id: ChainId },

    #[error("Token {token} is not an asset of omnipool {pool}")]
    UnknownPoolAsset { token: String, pool: Address },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A fee or protocol minimum would consume or exceed a quoted amount
#[derive(Debug, Error)]
pub enum AmountError {
    #[error("Amount {amount} is less than fee {fee}")]
    LessThanFee { amount: String, fee: String },

    #[error("Amount {amount} is too low: {reason}")]
    TooLow { amount: String, reason: String },

    #[error("Token mismatch: expected {expected}, found {found}")]
    TokenMismatch { expected: String, found: String },

    #[error("Subtracting {subtrahend} from {amount} would go below zero")]
    Underflow { amount: String, subtrahend: String },

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

/// Fee estimator or quoting service failed
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("Fee estimate {chain_from} -> {chain_to} (receive side {receive_side}) failed: {message}")]
    FeeEstimate {
        chain_from: ChainId,
        chain_to: ChainId,
        receive_side: Address,
        message: String,
    },

    #[error("Quote from {provider} failed: {message}")]
    Quote { provider: String, message: String },

    #[error("Malformed response from {service}: {message}")]
    Malformed { service: String, message: String },

    #[error("Request to {service} timed out after {seconds}s")]
    Timeout { service: String, seconds: u64 },
}

/// Calldata patch point does not fit the calldata it refers to
#[derive(Debug, Error)]
pub enum CalldataError {
    #[error("Offset {offset} out of bounds for calldata of {len} bytes")]
    OffsetOutOfBounds { offset: usize, len: usize },
}

/// Result type alias for Omniroute operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => match e {
                ConfigError::MissingRepresentation { .. } => "missing_representation",
                ConfigError::UnknownChain { .. } => "unknown_chain",
                ConfigError::MissingChainConfig { .. } => "missing_chain_config",
                ConfigError::UnknownPoolAsset { .. } => "unknown_pool_asset",
                ConfigError::Invalid(_) => "invalid_config",
            },
            Self::Amount(e) => match e {
                AmountError::LessThanFee { .. } => "amount_less_than_fee",
                AmountError::TooLow { .. } => "amount_too_low",
                AmountError::TokenMismatch { .. } => "token_mismatch",
                AmountError::Underflow { .. } => "amount_underflow",
                AmountError::Overflow(_) => "amount_overflow",
            },
            Self::External(e) => match e {
                ExternalServiceError::FeeEstimate { .. } => "fee_estimate_failed",
                ExternalServiceError::Quote { .. } => "quote_failed",
                ExternalServiceError::Malformed { .. } => "malformed_response",
                ExternalServiceError::Timeout { .. } => "timeout",
            },
            Self::Calldata(_) => "calldata_offset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: Error = AmountError::LessThanFee {
            amount: "1".into(),
            fee: "2".into(),
        }
        .into();
        assert_eq!(err.error_code(), "amount_less_than_fee");

        let err: Error = ConfigError::UnknownChain {
            chain_id: ChainId(7),
        }
        .into();
        assert_eq!(err.error_code(), "unknown_chain");
        assert_eq!(
            err.to_string(),
            "Configuration error: Chain 7 is not in the chain priority list"
        );
    }
}
