// Contract integration module
// This module handles all smart contract interactions

pub mod abis;
pub mod addresses;
pub mod config;
pub mod deploy;
pub mod event_utils;
pub mod market_client;
pub mod registry_client;
pub mod types;

// Re-export main components for easy access
pub use deploy::MarketDeployer;
pub use market_client::WdlMarketClient;
pub use registry_client::ReferralRegistryClient;
pub use types::*;
