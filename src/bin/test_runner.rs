use wdl_markets::tests::{
    listener_tests::test_event_listener,
    market_tests::{test_buy_and_sell_shares, test_claim_winnings, test_market_summary, test_quotes},
    registry_tests::{
        test_claim_rewards, test_connection, test_referral_summary, test_register_market,
        test_set_referrer,
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("WDL Markets Contract Test Runner");
    println!("================================\n");

    let args: Vec<String> = std::env::args().collect();
    let test_name = args.get(1).map(|s| s.as_str()).unwrap_or("all");

    match test_name {
        "connection" => {
            test_connection().await?;
        }
        "referral_summary" => {
            test_referral_summary().await?;
        }
        "set_referrer" => {
            test_set_referrer().await?;
        }
        "register_market" => {
            test_register_market().await?;
        }
        "claim_rewards" => {
            test_claim_rewards().await?;
        }
        "market_summary" => {
            test_market_summary().await?;
        }
        "quotes" => {
            test_quotes().await?;
        }
        "trade" => {
            test_buy_and_sell_shares().await?;
        }
        "claim" => {
            test_claim_winnings().await?;
        }
        "listener" => {
            test_event_listener().await?;
        }
        "all" => {
            test_connection().await?;
            test_register_market().await?;
            test_referral_summary().await?;
            test_set_referrer().await?;
            test_market_summary().await?;
            test_quotes().await?;
            test_buy_and_sell_shares().await?;
            test_claim_rewards().await?;
            test_claim_winnings().await?;
            test_event_listener().await?;
        }
        other => {
            eprintln!("Unknown test: {}", other);
            eprintln!(
                "Available: connection, referral_summary, set_referrer, register_market, \
                 claim_rewards, market_summary, quotes, trade, claim, listener, all"
            );
            std::process::exit(1);
        }
    }

    println!("\nDone.");
    Ok(())
}
