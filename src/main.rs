use dotenvy::dotenv;
use tokio::time::Duration;
use tracing::{error, info};

use wdl_markets::config::Config;
use wdl_markets::infrastructure::contracts::config::get_current_chain_config;
use wdl_markets::infrastructure::workers::WorkerManager;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::load();
    let chain = get_current_chain_config().map_err(|e| {
        error!("Failed to load chain configuration: {}", e);
        e
    })?;

    info!(
        "Starting WDL markets daemon on {} (chain id {})",
        chain.name, chain.chain_id
    );

    let mut worker_manager = WorkerManager::new();
    worker_manager
        .start(
            &chain.rpc_url,
            chain.contract_addresses.referral_registry,
            vec![chain.contract_addresses.wdl_template],
            Duration::from_secs(config.poll_interval_secs),
            config.confirmations,
            config.start_block,
        )
        .await
        .map_err(|e| {
            error!("Failed to start worker manager: {}", e);
            e
        })?;

    let mut stream = worker_manager.subscribe(config.subscription_capacity).await;

    loop {
        tokio::select! {
            maybe_event = stream.recv() => {
                match maybe_event {
                    Some(decoded) => {
                        info!(
                            "{} at block {} from {:?}: {:?}",
                            decoded.event.name(),
                            decoded.meta.block_number,
                            decoded.meta.contract,
                            decoded.event
                        );
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    worker_manager.stop().await;
    Ok(())
}
