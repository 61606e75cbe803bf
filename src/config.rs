use std::env;

/// Daemon configuration, read once at startup
pub struct Config {
    pub poll_interval_secs: u64,
    /// Blocks behind the head the listener stays to avoid shallow reorgs
    pub confirmations: u64,
    /// Explicit block to resume ingestion from; latest head when unset
    pub start_block: Option<u64>,
    pub subscription_capacity: usize,
}

impl Config {
    pub fn load() -> Self {
        Config {
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("Invalid POLL_INTERVAL_SECS"),
            confirmations: env::var("CONFIRMATIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .expect("Invalid CONFIRMATIONS"),
            start_block: env::var("START_BLOCK")
                .ok()
                .map(|v| v.parse().expect("Invalid START_BLOCK")),
            subscription_capacity: env::var("SUBSCRIPTION_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .expect("Invalid SUBSCRIPTION_CAPACITY"),
        }
    }
}
