use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, Filter},
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::services::ContractError;
use crate::infrastructure::workers::events::{decode_market_event, DecodedEvent, MarketEvent};

/// Subscription handle returned by [`SubscriberRegistry::subscribe`].
///
/// Dropping the stream or calling `shutdown` detaches it from the listener.
pub struct EventStream {
    pub id: Uuid,
    rx: mpsc::Receiver<DecodedEvent>,
    quit_tx: watch::Sender<bool>,
}

impl EventStream {
    /// Receive the next event; `None` once the listener has stopped
    pub async fn recv(&mut self) -> Option<DecodedEvent> {
        self.rx.recv().await
    }

    /// Signal the listener to stop delivering to this stream
    pub fn shutdown(&self) {
        let _ = self.quit_tx.send(true);
    }
}

struct Subscriber {
    id: Uuid,
    tx: mpsc::Sender<DecodedEvent>,
    quit_rx: watch::Receiver<bool>,
}

/// Shared set of event subscribers; cloned between the listener and the
/// worker manager so subscriptions can be opened while the listener runs.
#[derive(Clone)]
pub struct SubscriberRegistry {
    inner: Arc<RwLock<Vec<Subscriber>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Open a new subscription with the given channel capacity
    pub async fn subscribe(&self, capacity: usize) -> EventStream {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(capacity);
        let (quit_tx, quit_rx) = watch::channel(false);

        self.inner.write().await.push(Subscriber { id, tx, quit_rx });
        debug!("Opened event subscription {}", id);

        EventStream { id, rx, quit_tx }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Fan an event out to every live subscriber.
    ///
    /// A full channel drops the event for that subscriber only; closed or
    /// quit subscribers are removed.
    pub async fn dispatch(&self, event: &DecodedEvent) {
        let mut dead: Vec<Uuid> = Vec::new();

        {
            let subscribers = self.inner.read().await;
            for subscriber in subscribers.iter() {
                if *subscriber.quit_rx.borrow() {
                    dead.push(subscriber.id);
                    continue;
                }
                match subscriber.tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(
                            "Subscriber {} channel full, dropping {} event",
                            subscriber.id,
                            event.event.name()
                        );
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dead.push(subscriber.id);
                    }
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.inner.write().await;
            subscribers.retain(|s| !dead.contains(&s.id));
            debug!("Removed {} dead event subscribers", dead.len());
        }
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls the chain for logs from the registry and all known markets,
/// decodes them and fans them out to subscribers.
///
/// Markets observed in `MarketRegistered` logs join the filter from the
/// next processed range onward.
pub struct ChainEventListener {
    provider: Arc<Provider<Http>>,
    registry_address: Address,
    market_addresses: Vec<Address>,
    last_processed_block: u64,
    poll_interval: Duration,
    confirmations: u64,
    max_block_range: u64,
    subscribers: SubscriberRegistry,
    shutdown_rx: watch::Receiver<bool>,
}

impl ChainEventListener {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<Provider<Http>>,
        registry_address: Address,
        market_addresses: Vec<Address>,
        poll_interval: Duration,
        confirmations: u64,
        start_block: Option<u64>,
        subscribers: SubscriberRegistry,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            provider,
            registry_address,
            market_addresses,
            last_processed_block: start_block.unwrap_or(0),
            poll_interval,
            confirmations,
            max_block_range: 2000,
            subscribers,
            shutdown_rx,
        }
    }

    pub async fn start(&mut self) -> Result<(), ContractError> {
        info!(
            "Starting chain event listener (registry {:?}, {} markets)",
            self.registry_address,
            self.market_addresses.len()
        );

        if self.last_processed_block == 0 {
            let current_block = self
                .provider
                .get_block_number()
                .await
                .map_err(|e| ContractError::RpcError(e.to_string()))?;
            self.last_processed_block = current_block.as_u64().saturating_sub(self.confirmations);
            info!("Starting from block: {}", self.last_processed_block);
        }

        let mut interval = interval(self.poll_interval);
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.process_new_blocks().await {
                        error!("Error processing blocks: {}", e);
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Chain event listener shutting down");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    async fn process_new_blocks(&mut self) -> Result<(), ContractError> {
        let current_block = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?
            .as_u64();

        let safe_head = current_block.saturating_sub(self.confirmations);
        if safe_head <= self.last_processed_block {
            return Ok(());
        }

        let mut from_block = self.last_processed_block + 1;
        while from_block <= safe_head {
            let to_block = (from_block + self.max_block_range - 1).min(safe_head);
            debug!("Processing blocks {} to {}", from_block, to_block);

            // Do not advance past a failed range; it is retried next tick
            self.process_range(from_block, to_block).await?;
            self.last_processed_block = to_block;
            from_block = to_block + 1;
        }

        Ok(())
    }

    async fn process_range(&mut self, from_block: u64, to_block: u64) -> Result<(), ContractError> {
        let mut addresses = Vec::with_capacity(self.market_addresses.len() + 1);
        addresses.push(self.registry_address);
        addresses.extend(self.market_addresses.iter().copied());

        let filter = Filter::new()
            .address(addresses)
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        for log in &logs {
            let decoded = match decode_market_event(log) {
                Ok(Some(decoded)) => decoded,
                Ok(None) => {
                    debug!("Skipping unknown log from {:?}", log.address);
                    continue;
                }
                Err(e) => {
                    error!("Failed to decode log from {:?}: {}", log.address, e);
                    continue;
                }
            };

            if let MarketEvent::MarketRegistered { market } = decoded.event {
                self.watch_market(market);
            }

            info!(
                "Observed {} at block {} from {:?}",
                decoded.event.name(),
                decoded.meta.block_number,
                decoded.meta.contract
            );
            self.subscribers.dispatch(&decoded).await;
        }

        Ok(())
    }

    /// Add a market to the log filter if it is not already watched
    fn watch_market(&mut self, market: Address) {
        if market != self.registry_address && !self.market_addresses.contains(&market) {
            info!("Watching new market {:?}", market);
            self.market_addresses.push(market);
        }
    }

    pub fn watched_market_count(&self) -> usize {
        self.market_addresses.len()
    }

    pub fn last_processed_block(&self) -> u64 {
        self.last_processed_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::workers::events::EventMeta;
    use chrono::Utc;
    use ethers::types::{H256, U256};

    fn sample_event() -> DecodedEvent {
        DecodedEvent {
            event: MarketEvent::RewardsClaimed {
                referrer: Address::zero(),
                amount: U256::from(7u64),
            },
            meta: EventMeta {
                contract: Address::zero(),
                block_number: 1,
                transaction_hash: H256::zero(),
                log_index: 0,
                observed_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_subscriber() {
        let registry = SubscriberRegistry::new();
        let mut stream = registry.subscribe(8).await;

        registry.dispatch(&sample_event()).await;

        let received = stream.recv().await.unwrap();
        assert_eq!(received.event.name(), "RewardsClaimed");
    }

    #[tokio::test]
    async fn shutdown_detaches_subscriber() {
        let registry = SubscriberRegistry::new();
        let stream = registry.subscribe(8).await;
        assert_eq!(registry.subscriber_count().await, 1);

        stream.shutdown();
        registry.dispatch(&sample_event()).await;

        assert_eq!(registry.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_stream_is_removed_on_dispatch() {
        let registry = SubscriberRegistry::new();
        let stream = registry.subscribe(8).await;
        drop(stream);

        registry.dispatch(&sample_event()).await;
        assert_eq!(registry.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn full_channel_drops_event_but_keeps_subscriber() {
        let registry = SubscriberRegistry::new();
        let mut stream = registry.subscribe(1).await;

        registry.dispatch(&sample_event()).await;
        registry.dispatch(&sample_event()).await; // dropped, channel full

        assert_eq!(registry.subscriber_count().await, 1);
        assert!(stream.recv().await.is_some());
    }
}
