//! Core type definitions for Omniroute

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::errors::AmountError;

/// Chain identifier (EIP-155 style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ChainId> for U256 {
    fn from(id: ChainId) -> Self {
        U256::from(id.0)
    }
}

/// A token deployed on a specific chain.
///
/// Equality and hashing only consider `(chain_id, address)`; symbol and
/// decimals are metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub chain_id: ChainId,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    /// Source chain when this token is a synthetic representation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_from_id: Option<ChainId>,
    /// Gas token of its chain (paid as call value, not via approve)
    #[serde(default)]
    pub is_native: bool,
}

impl Token {
    pub fn new(chain_id: ChainId, address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
            chain_from_id: None,
            is_native: false,
        }
    }

    /// Mark this token as a synthetic representation of an asset from `chain_from_id`
    pub fn synthetic_of(mut self, chain_from_id: ChainId) -> Self {
        self.chain_from_id = Some(chain_from_id);
        self
    }

    /// Mark this token as the chain's gas token
    pub fn native(mut self) -> Self {
        self.is_native = true;
        self
    }

    pub fn is_synthetic(&self) -> bool {
        self.chain_from_id.is_some()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.chain_id)
    }
}

/// Amount of a token in its smallest unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token: Token,
    pub raw: U256,
}

impl TokenAmount {
    pub fn new(token: Token, raw: U256) -> Self {
        Self { token, raw }
    }

    pub fn zero(token: Token) -> Self {
        Self::new(token, U256::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Re-label the same raw value in another token's unit.
    ///
    /// Synthetic representations share decimals with their origin, so the raw
    /// value carries over unchanged.
    pub fn retype(&self, token: &Token) -> Self {
        Self::new(token.clone(), self.raw)
    }

    fn ensure_same_token(&self, other: &TokenAmount) -> Result<(), AmountError> {
        if self.token != other.token {
            return Err(AmountError::TokenMismatch {
                expected: self.token.to_string(),
                found: other.token.to_string(),
            });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &TokenAmount) -> Result<Self, AmountError> {
        self.ensure_same_token(other)?;
        let raw = self
            .raw
            .checked_add(other.raw)
            .ok_or_else(|| AmountError::Overflow(format!("{} + {}", self, other)))?;
        Ok(Self::new(self.token.clone(), raw))
    }

    /// Subtract, failing on token mismatch or when the result would be negative
    pub fn checked_sub(&self, other: &TokenAmount) -> Result<Self, AmountError> {
        self.ensure_same_token(other)?;
        let raw = self
            .raw
            .checked_sub(other.raw)
            .ok_or_else(|| AmountError::Underflow {
                amount: self.to_string(),
                subtrahend: other.to_string(),
            })?;
        Ok(Self::new(self.token.clone(), raw))
    }

    pub fn try_cmp(&self, other: &TokenAmount) -> Result<Ordering, AmountError> {
        self.ensure_same_token(other)?;
        Ok(self.raw.cmp(&other.raw))
    }

    /// Human-readable decimal string (e.g. "71.28")
    pub fn to_exact(&self) -> String {
        let digits = self.raw.to_string();
        let decimals = self.token.decimals as usize;
        if decimals == 0 {
            return digits;
        }

        let padded = if digits.len() <= decimals {
            format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{}.{}", int_part, frac_part)
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_exact(), self.token.symbol)
    }
}

/// Sum per-leg price impacts (percent), capped at 100%
pub fn total_price_impact(impacts: &[f64]) -> f64 {
    impacts.iter().sum::<f64>().min(100.0)
}

/// Slippage tolerance in basis points (100 = 1%)
pub type SlippageBps = u32;

/// Unix timestamp (seconds) forwarded into on-chain calldata
pub type Deadline = u64;
