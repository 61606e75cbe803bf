use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ============ MARKET TRADE MODELS ============

#[derive(Debug, Deserialize)]
pub struct BuySharesRequest {
    pub market: Arc<str>,
    /// Outcome index: 0 = win, 1 = draw, 2 = lose
    pub outcome: u8,
    /// Amount of native currency to spend, in ether units (decimal string)
    pub amount_eth: Arc<str>,
    /// Minimum shares to receive, in wei units; 0 when absent
    pub min_shares_out: Option<Arc<str>>,
    pub referrer: Option<Arc<str>>,
}

#[derive(Debug, Serialize)]
pub struct BuySharesResponse {
    pub market: Arc<str>,
    pub buyer: Arc<str>,
    pub outcome: u8,
    pub amount_in_wei: Arc<str>,
    pub shares_out: Arc<str>,
    pub fee_wei: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

#[derive(Debug, Deserialize)]
pub struct SellSharesRequest {
    pub market: Arc<str>,
    pub outcome: u8,
    /// Shares to sell, in wei units (decimal string)
    pub shares: Arc<str>,
    pub min_amount_out: Option<Arc<str>>,
}

#[derive(Debug, Serialize)]
pub struct SellSharesResponse {
    pub market: Arc<str>,
    pub seller: Arc<str>,
    pub outcome: u8,
    pub shares_in: Arc<str>,
    pub amount_out_wei: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

#[derive(Debug, Deserialize)]
pub struct ClaimWinningsRequest {
    pub market: Arc<str>,
}

#[derive(Debug, Serialize)]
pub struct ClaimWinningsResponse {
    pub market: Arc<str>,
    pub account: Arc<str>,
    pub amount_wei: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

// ============ MARKET LIFECYCLE MODELS ============

#[derive(Debug, Deserialize)]
pub struct ResolveMarketRequest {
    pub market: Arc<str>,
    pub outcome: u8,
}

#[derive(Debug, Serialize)]
pub struct ResolveMarketResponse {
    pub market: Arc<str>,
    pub result: u8,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

#[derive(Debug, Deserialize)]
pub struct RaiseDisputeRequest {
    pub market: Arc<str>,
    /// Dispute bond in ether units (decimal string)
    pub bond_eth: Arc<str>,
}

#[derive(Debug, Serialize)]
pub struct RaiseDisputeResponse {
    pub market: Arc<str>,
    pub challenger: Arc<str>,
    pub bond_wei: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

#[derive(Debug, Deserialize)]
pub struct SettleDisputeRequest {
    pub market: Arc<str>,
    pub outcome: u8,
}

#[derive(Debug, Serialize)]
pub struct SettleDisputeResponse {
    pub market: Arc<str>,
    pub result: u8,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

// ============ REFERRAL MODELS ============

#[derive(Debug, Deserialize)]
pub struct SetReferrerRequest {
    pub referrer: Arc<str>,
}

#[derive(Debug, Serialize)]
pub struct SetReferrerResponse {
    pub user: Arc<str>,
    pub referrer: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

#[derive(Debug, Serialize)]
pub struct ClaimRewardsResponse {
    pub referrer: Arc<str>,
    pub amount_wei: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterMarketRequest {
    pub market: Arc<str>,
}

#[derive(Debug, Serialize)]
pub struct RegisterMarketResponse {
    pub market: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}

// ============ DEPLOYMENT MODELS ============

#[derive(Debug, Deserialize)]
pub struct DeployMarketRequest {
    /// External fixture identifier, e.g. "epl-2025-08-arsenal-chelsea"
    pub fixture_id: Arc<str>,
    /// Unix timestamp after which trading closes
    pub close_time: u64,
    /// Seconds after resolution during which a dispute may be raised
    pub dispute_window_secs: u64,
    pub fee_bps: u16,
}

#[derive(Debug, Serialize)]
pub struct DeployMarketResponse {
    pub market: Arc<str>,
    pub fixture_id: Arc<str>,
    pub transaction_hash: Arc<str>,
    pub block_number: u64,
}
