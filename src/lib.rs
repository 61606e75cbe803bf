pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod tests;

// Main exports for external use
pub use infrastructure::contracts::{MarketDeployer, ReferralRegistryClient, WdlMarketClient};
pub use infrastructure::workers::{EventStream, MarketEvent, WorkerManager};
