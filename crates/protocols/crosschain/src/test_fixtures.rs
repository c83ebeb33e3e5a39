//! Shared fixtures for crate tests
//!
//! Three chains: Ethereum and Avalanche around a BSC-hosted omnipool holding
//! host BUSD plus synthetic USDC (from Ethereum) and USDT (from Avalanche).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use octopool::PoolQuoter;
use omni_core::{ChainId, ChainPriority, OmniPoolConfig, Result, Token};

use crate::fee_collector::FeeCollectorRegistry;
use crate::representation::{RepresentationEntry, RepresentationLookup, RepresentationTable};
use crate::transit::TransitContext;

pub const ETH: ChainId = ChainId(1);
pub const BSC: ChainId = ChainId(56);
pub const AVAX: ChainId = ChainId(43114);

pub fn e18(v: u64) -> U256 {
    U256::from(v) * U256::from(1_000_000_000_000_000_000u64)
}

pub fn usdc_eth() -> Token {
    Token::new(ETH, Address::repeat_byte(0x01), 6, "USDC")
}

pub fn s_usdc_eth() -> Token {
    Token::new(BSC, Address::repeat_byte(0x11), 6, "sUSDC").synthetic_of(ETH)
}

pub fn usdt_avax() -> Token {
    Token::new(AVAX, Address::repeat_byte(0x03), 18, "USDT")
}

pub fn s_usdt_avax() -> Token {
    Token::new(BSC, Address::repeat_byte(0x13), 18, "sUSDT").synthetic_of(AVAX)
}

pub fn busd_bsc() -> Token {
    Token::new(BSC, Address::repeat_byte(0x02), 18, "BUSD")
}

pub fn priority() -> ChainPriority {
    ChainPriority::new([ETH, BSC, AVAX])
}

pub fn pool() -> OmniPoolConfig {
    OmniPoolConfig {
        chain_id: BSC,
        address: Address::repeat_byte(0xb0),
        coin_gecko_id: "usd-coin".to_string(),
        assets: vec![busd_bsc(), s_usdc_eth(), s_usdt_avax()],
    }
}

pub fn representations() -> RepresentationTable {
    RepresentationTable::new(vec![
        RepresentationEntry {
            original: usdc_eth(),
            synthetics: vec![s_usdc_eth()],
        },
        RepresentationEntry {
            original: usdt_avax(),
            synthetics: vec![s_usdt_avax()],
        },
    ])
}

/// Representation table that records every lookup
#[derive(Default)]
pub struct CountingLookup {
    pub table: RepresentationTable,
    pub lookups: Mutex<Vec<(Token, ChainId)>>,
}

impl CountingLookup {
    pub fn new() -> Self {
        Self {
            table: representations(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<(Token, ChainId)> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl RepresentationLookup for CountingLookup {
    fn representation(&self, token: &Token, chain_id: ChainId) -> Option<Token> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push((token.clone(), chain_id));
        }
        self.table.representation(token, chain_id)
    }
}

/// Pool quoting a fixed `out / in` ratio
pub struct LinearQuoter {
    pub numerator: U256,
    pub denominator: U256,
    pub calls: AtomicUsize,
}

impl LinearQuoter {
    pub fn new(numerator: U256, denominator: U256) -> Self {
        Self {
            numerator,
            denominator,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolQuoter for LinearQuoter {
    async fn calculate_swap(
        &self,
        _pool: &OmniPoolConfig,
        _index_in: u8,
        _index_out: u8,
        amount: U256,
    ) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(amount * self.numerator / self.denominator)
    }
}

pub fn host_multicall_router() -> Address {
    Address::repeat_byte(0x5c)
}

/// 6-decimal 100 in -> 18-decimal 80 out
pub fn context() -> TransitContext {
    context_with_ratio(U256::from(800_000_000_000u64), U256::from(1u64))
}

pub fn context_with_ratio(numerator: U256, denominator: U256) -> TransitContext {
    TransitContext {
        representations: Arc::new(representations()),
        chain_priority: priority(),
        fee_collectors: Arc::new(FeeCollectorRegistry::default()),
        quoter: Arc::new(LinearQuoter::new(numerator, denominator)),
        multicall_router: host_multicall_router(),
    }
}
