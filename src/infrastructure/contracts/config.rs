use crate::domain::services::ContractError;
use crate::infrastructure::contracts::addresses;
use crate::infrastructure::contracts::types::{
    ChainConfig, ContractAddresses, GasPriceStrategy, GasSettings, NativeCurrency,
};

/// Get all available chains from environment variables
pub fn get_available_chains_from_env() -> Result<Vec<ChainConfig>, ContractError> {
    let mut available_chains = Vec::new();

    // Anvil (local development)
    if let Ok(chain_id) = std::env::var("ANVIL_CHAIN_ID") {
        if chain_id == "31337" {
            available_chains.push(get_anvil_config()?);
        }
    }

    // Base Sepolia
    if let Ok(chain_id) = std::env::var("BASE_SEPOLIA_CHAIN_ID") {
        if chain_id == "84532" {
            available_chains.push(get_base_sepolia_config()?);
        }
    }

    if available_chains.is_empty() {
        available_chains.push(get_anvil_config()?);
    }

    Ok(available_chains)
}

/// Get the current chain configuration from environment variables
pub fn get_current_chain_config() -> Result<ChainConfig, ContractError> {
    let chain_id = std::env::var("DEFAULT_CHAIN_ID")
        .unwrap_or_else(|_| "31337".to_string())
        .parse::<u64>()
        .unwrap_or(31337);

    let available_chains = get_available_chains_from_env()?;
    if let Some(config) = available_chains.iter().find(|c| c.chain_id == chain_id) {
        return Ok(config.clone());
    }

    match chain_id {
        84532 => get_base_sepolia_config(),
        31337 => get_anvil_config(),
        _ => get_anvil_config(),
    }
}

/// Get all supported chain configurations
pub fn get_supported_chains() -> Result<Vec<ChainConfig>, ContractError> {
    let env_chains = get_available_chains_from_env()?;
    if !env_chains.is_empty() {
        return Ok(env_chains);
    }

    Ok(vec![get_anvil_config()?, get_base_sepolia_config()?])
}

/// Get chain configuration by chain ID
pub fn get_chain_config_by_id(chain_id: u64) -> Result<Option<ChainConfig>, ContractError> {
    let supported_chains = get_supported_chains()?;
    Ok(supported_chains.into_iter().find(|config| config.chain_id == chain_id))
}

/// Validate if a chain ID is supported
pub fn is_chain_supported(chain_id: u64) -> Result<bool, ContractError> {
    let supported_chains = get_supported_chains()?;
    Ok(supported_chains.iter().any(|config| config.chain_id == chain_id))
}

/// Anvil local development configuration
fn get_anvil_config() -> Result<ChainConfig, ContractError> {
    Ok(ChainConfig {
        chain_id: 31337,
        name: "Anvil Local".to_string(),
        rpc_url: std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8545".to_string()),
        ws_url: None,
        explorer_url: "".to_string(),
        native_currency: NativeCurrency {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
        gas_settings: GasSettings {
            default_gas_limit: 300000,
            max_gas_limit: 30000000,
            gas_price_strategy: GasPriceStrategy::Fixed(20000000000), // 20 gwei
            block_time_seconds: 1,
        },
        contract_addresses: get_anvil_contract_addresses()?,
    })
}

/// Base Sepolia testnet configuration
fn get_base_sepolia_config() -> Result<ChainConfig, ContractError> {
    Ok(ChainConfig {
        chain_id: 84532,
        name: "Base Sepolia".to_string(),
        rpc_url: std::env::var("BASE_SEPOLIA_RPC_URL")
            .unwrap_or_else(|_| "https://sepolia.base.org".to_string()),
        ws_url: None,
        explorer_url: "https://sepolia.basescan.org".to_string(),
        native_currency: NativeCurrency {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
        gas_settings: GasSettings {
            default_gas_limit: 300000,
            max_gas_limit: 30000000,
            gas_price_strategy: GasPriceStrategy::Eip1559,
            block_time_seconds: 2,
        },
        contract_addresses: get_base_sepolia_contract_addresses()?,
    })
}

fn get_anvil_contract_addresses() -> Result<ContractAddresses, ContractError> {
    addresses::load_local_addresses()
}

fn get_base_sepolia_contract_addresses() -> Result<ContractAddresses, ContractError> {
    addresses::load_base_sepolia_addresses()
}

/// Get gas limit for a specific operation on the current chain
pub fn get_gas_limit_for_operation(operation: &str) -> Result<u64, ContractError> {
    let config = get_current_chain_config()?;
    Ok(match operation {
        "buy_shares" => config.gas_settings.default_gas_limit,
        "sell_shares" => config.gas_settings.default_gas_limit,
        "deploy_market" => config.gas_settings.max_gas_limit / 10,
        "resolve" => 150000,
        "raise_dispute" => 150000,
        "settle_dispute" => 150000,
        "finalize" => 200000,
        "claim" => 150000,
        "pause" => 100000,
        "unpause" => 100000,
        "close_trading" => 100000,
        "set_referrer" => 100000,
        "claim_rewards" => 150000,
        "register_market" => 100000,
        _ => config.gas_settings.default_gas_limit,
    })
}

/// Get private key with fallback for Anvil
pub fn get_private_key() -> Result<String, ContractError> {
    match std::env::var("PRIVATE_KEY") {
        Ok(key) => Ok(key),
        Err(_) => {
            let chain_id = std::env::var("DEFAULT_CHAIN_ID")
                .unwrap_or_else(|_| "31337".to_string())
                .parse::<u64>()
                .unwrap_or(31337);

            if chain_id == 31337 {
                // Default Anvil development key
                Ok("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string())
            } else {
                Err(ContractError::MissingPrivateKey {
                    reason: format!(
                        "PRIVATE_KEY environment variable not set. Required for chain ID: {}",
                        chain_id
                    ),
                })
            }
        }
    }
}
