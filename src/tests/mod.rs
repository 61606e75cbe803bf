pub mod market_tests;
pub mod registry_tests;

use crate::domain::services::ContractError;
use crate::infrastructure::contracts::addresses::get_contract_addresses_by_chain_id;
use crate::infrastructure::contracts::config::get_private_key;
use crate::infrastructure::contracts::types::ContractAddresses;
use crate::infrastructure::contracts::{ReferralRegistryClient, WdlMarketClient};

/// Test configuration and setup
pub struct TestConfig {
    pub rpc_url: String,
    pub private_key: String,
    pub chain_id: u64,
    pub addresses: ContractAddresses,
}

impl TestConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let rpc_url = std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());
        let chain_id = std::env::var("CHAIN_ID")
            .unwrap_or_else(|_| "31337".to_string())
            .parse::<u64>()?;
        let private_key = get_private_key()?;
        let addresses = get_contract_addresses_by_chain_id(chain_id)?;

        Ok(Self {
            rpc_url,
            private_key,
            chain_id,
            addresses,
        })
    }

    pub fn registry_client(&self) -> Result<ReferralRegistryClient, ContractError> {
        ReferralRegistryClient::new(
            &self.rpc_url,
            &self.private_key,
            self.chain_id,
            self.addresses.referral_registry,
        )
    }

    pub fn market_client(&self) -> Result<WdlMarketClient, ContractError> {
        WdlMarketClient::new(
            &self.rpc_url,
            &self.private_key,
            self.chain_id,
            self.addresses.wdl_template,
        )
    }
}
