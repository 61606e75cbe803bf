use ethers::types::U256;
use ethers::utils::parse_ether;
use std::sync::Arc;

use crate::domain::models::{BuySharesRequest, ClaimWinningsRequest, SellSharesRequest};
use crate::infrastructure::contracts::types::Outcome;
use crate::tests::TestConfig;

/// Read the aggregate market view
pub async fn test_market_summary() -> Result<(), Box<dyn std::error::Error>> {
    println!("Testing market summary...");

    let config = TestConfig::from_env()?;
    let market = config.market_client()?;

    let summary = market.market_summary().await?;
    println!("   Fixture: {}", summary.fixture_id);
    println!("   Status: {}", summary.status.as_str());
    println!("   Close time: {}", summary.close_time);
    println!("   Fee: {} bps", summary.fee_bps);
    println!("   Total liquidity: {} wei", summary.total_liquidity);
    for (outcome, price) in [Outcome::Win, Outcome::Draw, Outcome::Lose].iter().zip(summary.prices.iter()) {
        println!("   Price[{}]: {} wei/share", outcome.as_str(), price);
    }

    Ok(())
}

/// Read buy and sell quotes for a small stake
pub async fn test_quotes() -> Result<(), Box<dyn std::error::Error>> {
    println!("Testing quotes...");

    let config = TestConfig::from_env()?;
    let market = config.market_client()?;

    let stake = parse_ether("0.01")?;
    let shares_out = market.quote_buy(Outcome::Win, stake).await?;
    println!("   0.01 ETH buys {} win shares", shares_out);
    assert!(!shares_out.is_zero());

    let amount_out = market.quote_sell(Outcome::Win, shares_out).await?;
    println!("   Selling them back returns {} wei", amount_out);
    // Round trip never beats the fee
    assert!(amount_out <= stake);

    Ok(())
}

/// Buy win shares then sell half of them back
pub async fn test_buy_and_sell_shares() -> Result<(), Box<dyn std::error::Error>> {
    println!("Testing buy and sell shares...");

    let config = TestConfig::from_env()?;
    let market = config.market_client()?;
    let market_address = Arc::from(format!("{:?}", market.address()));

    let buy = market
        .buy_shares(BuySharesRequest {
            market: Arc::clone(&market_address),
            outcome: Outcome::Win.as_u8(),
            amount_eth: Arc::from("0.01"),
            min_shares_out: None,
            referrer: None,
        })
        .await?;
    println!(
        "   Bought {} shares (fee {} wei) in tx {}",
        buy.shares_out, buy.fee_wei, buy.transaction_hash
    );

    let shares_out = U256::from_dec_str(&buy.shares_out)?;
    assert!(!shares_out.is_zero());

    let held = market.shares_of(market.wallet_address(), Outcome::Win).await?;
    assert!(held >= shares_out);

    let to_sell = shares_out / 2;
    let sell = market
        .sell_shares(SellSharesRequest {
            market: market_address,
            outcome: Outcome::Win.as_u8(),
            shares: Arc::from(to_sell.to_string()),
            min_amount_out: None,
        })
        .await?;
    println!(
        "   Sold {} shares for {} wei in tx {}",
        sell.shares_in, sell.amount_out_wei, sell.transaction_hash
    );

    assert!(!U256::from_dec_str(&sell.amount_out_wei)?.is_zero());
    Ok(())
}

/// Claim winnings, tolerating markets that have not finalized
pub async fn test_claim_winnings() -> Result<(), Box<dyn std::error::Error>> {
    println!("Testing claim winnings...");

    let config = TestConfig::from_env()?;
    let market = config.market_client()?;

    let status = market.status().await?;
    if !matches!(status, crate::infrastructure::contracts::types::MarketStatus::Finalized) {
        println!("   Market is {}, nothing to claim yet", status.as_str());
        return Ok(());
    }

    let response = market
        .claim(ClaimWinningsRequest {
            market: Arc::from(format!("{:?}", market.address())),
        })
        .await?;
    println!(
        "   Claimed {} wei in tx {}",
        response.amount_wei, response.transaction_hash
    );

    Ok(())
}
