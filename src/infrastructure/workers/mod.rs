pub mod events;
pub mod market_listener;

use ethers::providers::{Http, Provider};
use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{error, info};

use crate::domain::services::ContractError;

pub use self::events::{DecodedEvent, EventMeta, MarketEvent};
pub use self::market_listener::{ChainEventListener, EventStream, SubscriberRegistry};

/// Owns the chain event listener task and its shutdown signal
pub struct WorkerManager {
    listener_handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<watch::Sender<bool>>,
    subscribers: SubscriberRegistry,
    running: bool,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self {
            listener_handle: None,
            shutdown_tx: None,
            subscribers: SubscriberRegistry::new(),
            running: false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn start(
        &mut self,
        rpc_url: &str,
        registry_address: Address,
        market_addresses: Vec<Address>,
        poll_interval: Duration,
        confirmations: u64,
        start_block: Option<u64>,
    ) -> Result<(), ContractError> {
        if self.running {
            return Ok(());
        }

        self.running = true;
        info!("Starting worker manager...");

        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut listener = ChainEventListener::new(
            Arc::new(provider),
            registry_address,
            market_addresses,
            poll_interval,
            confirmations,
            start_block,
            self.subscribers.clone(),
            shutdown_rx,
        );

        let handle = tokio::spawn(async move {
            if let Err(e) = listener.start().await {
                error!("Chain event listener failed: {}", e);
            }
        });

        self.listener_handle = Some(handle);
        self.shutdown_tx = Some(shutdown_tx);

        info!("Worker manager started successfully");
        Ok(())
    }

    /// Open a new event subscription; valid before and after start
    pub async fn subscribe(&self, capacity: usize) -> EventStream {
        self.subscribers.subscribe(capacity).await
    }

    pub async fn stop(&mut self) {
        if !self.running {
            return;
        }

        self.running = false;
        info!("Stopping worker manager...");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }

        if let Some(handle) = self.listener_handle.take() {
            if let Err(e) = handle.await {
                error!("Listener task join error: {}", e);
            }
        }

        info!("Worker manager stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for WorkerManager {
    fn default() -> Self {
        Self::new()
    }
}
