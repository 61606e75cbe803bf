use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::services::ContractError;

// ============ MARKET ENUMS ============

/// The three tradable outcomes of a WDL market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win = 0,
    Draw = 1,
    Lose = 2,
}

impl Outcome {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Draw => "draw",
            Outcome::Lose => "lose",
        }
    }
}

impl TryFrom<u8> for Outcome {
    type Error = ContractError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::Win),
            1 => Ok(Outcome::Draw),
            2 => Ok(Outcome::Lose),
            other => Err(ContractError::InvalidOutcome(other)),
        }
    }
}

/// Lifecycle states of a WDL market, mirroring the contract's status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    Open = 0,
    Paused = 1,
    TradingClosed = 2,
    Resolved = 3,
    Disputed = 4,
    Finalized = 5,
}

impl MarketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Open => "open",
            MarketStatus::Paused => "paused",
            MarketStatus::TradingClosed => "trading_closed",
            MarketStatus::Resolved => "resolved",
            MarketStatus::Disputed => "disputed",
            MarketStatus::Finalized => "finalized",
        }
    }

    /// Whether buy/sell traffic is accepted in this state
    pub fn is_tradable(&self) -> bool {
        matches!(self, MarketStatus::Open)
    }
}

impl TryFrom<u8> for MarketStatus {
    type Error = ContractError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MarketStatus::Open),
            1 => Ok(MarketStatus::Paused),
            2 => Ok(MarketStatus::TradingClosed),
            3 => Ok(MarketStatus::Resolved),
            4 => Ok(MarketStatus::Disputed),
            5 => Ok(MarketStatus::Finalized),
            other => Err(ContractError::InvalidStatus(other)),
        }
    }
}

// ============ CONTRACT STATE TYPES ============

/// Aggregate view of a single market, assembled from view calls
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketSummary {
    pub address: Arc<str>,
    pub fixture_id: Arc<str>,
    pub status: MarketStatus,
    pub close_time: u64,
    pub dispute_deadline: u64,
    pub fee_bps: u16,
    /// Present once the market has been resolved
    pub result: Option<Outcome>,
    /// Pool balances in wei, indexed win/draw/lose
    pub pools: [Arc<str>; 3],
    /// Spot prices in wei per share, indexed win/draw/lose
    pub prices: [Arc<str>; 3],
    pub total_liquidity: Arc<str>,
}

/// Aggregate view of a referrer's standing in the registry
#[derive(Debug, Serialize, Deserialize)]
pub struct ReferralSummary {
    pub referrer: Arc<str>,
    pub referred_count: u64,
    pub reward_balance_wei: Arc<str>,
    pub total_accrued_wei: Arc<str>,
    pub reward_bps: u16,
}

// ============ CONTRACT CONFIGURATION TYPES ============

/// Network configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub ws_url: Option<String>,
    pub explorer_url: String,
    pub native_currency: NativeCurrency,
}

/// Native currency information
#[derive(Debug, Clone)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Contract addresses for a network
#[derive(Debug, Clone)]
pub struct ContractAddresses {
    pub referral_registry: Address,
    /// Flagship template instance; further markets are deployed per fixture
    pub wdl_template: Address,
}

/// Chain-specific configuration
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub ws_url: Option<String>,
    pub explorer_url: String,
    pub native_currency: NativeCurrency,
    pub gas_settings: GasSettings,
    pub contract_addresses: ContractAddresses,
}

/// Gas settings for different chains
#[derive(Debug, Clone)]
pub struct GasSettings {
    pub default_gas_limit: u64,
    pub max_gas_limit: u64,
    pub gas_price_strategy: GasPriceStrategy,
    pub block_time_seconds: u64,
}

/// Gas price strategy for different chains
#[derive(Debug, Clone)]
pub enum GasPriceStrategy {
    Fixed(u64),
    Dynamic,
    Eip1559,
}

/// Transaction status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_roundtrip() {
        for raw in 0u8..3 {
            let outcome = Outcome::try_from(raw).unwrap();
            assert_eq!(outcome.as_u8(), raw);
        }
        assert!(matches!(
            Outcome::try_from(3),
            Err(ContractError::InvalidOutcome(3))
        ));
    }

    #[test]
    fn status_roundtrip() {
        for raw in 0u8..6 {
            let status = MarketStatus::try_from(raw).unwrap();
            assert_eq!(status as u8, raw);
        }
        assert!(matches!(
            MarketStatus::try_from(6),
            Err(ContractError::InvalidStatus(6))
        ));
    }

    #[test]
    fn only_open_markets_are_tradable() {
        assert!(MarketStatus::Open.is_tradable());
        assert!(!MarketStatus::Paused.is_tradable());
        assert!(!MarketStatus::TradingClosed.is_tradable());
        assert!(!MarketStatus::Resolved.is_tradable());
        assert!(!MarketStatus::Disputed.is_tradable());
        assert!(!MarketStatus::Finalized.is_tradable());
    }
}
