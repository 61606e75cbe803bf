use ethers::types::Address;
use std::collections::HashMap;
use std::fs;

use crate::domain::services::ContractError;
use crate::infrastructure::contracts::types::{ContractAddresses, NativeCurrency, NetworkConfig};

// Deployment outputs are written by the deploy scripts; the hardcoded local
// addresses match a fresh Anvil deployment from the default account.

/// Load contract addresses for local development (Anvil)
pub fn load_local_addresses() -> Result<ContractAddresses, ContractError> {
    if let Ok(addresses) = load_addresses_from_file("deployments/deployed_addresses_anvil.json") {
        return convert_json_to_addresses(addresses);
    }

    Ok(ContractAddresses {
        referral_registry: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?,
        wdl_template: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?,
    })
}

/// Load contract addresses for Base Sepolia
pub fn load_base_sepolia_addresses() -> Result<ContractAddresses, ContractError> {
    if let Ok(addresses) = load_addresses_from_file("deployments/deployed_addresses_base_sepolia.json") {
        return convert_json_to_addresses(addresses);
    }

    Err(ContractError::ContractCallError(
        "Base Sepolia addresses not found. Run deployment first.".to_string(),
    ))
}

/// Load addresses from a deployment output file
fn load_addresses_from_file(file_path: &str) -> Result<HashMap<String, String>, ContractError> {
    let content = fs::read_to_string(file_path).map_err(|e| {
        ContractError::ContractCallError(format!("Failed to read addresses file {}: {}", file_path, e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        ContractError::ContractCallError(format!("Failed to parse addresses JSON from {}: {}", file_path, e))
    })
}

fn convert_json_to_addresses(addresses: HashMap<String, String>) -> Result<ContractAddresses, ContractError> {
    let get_address = |key: &str| -> Result<Address, ContractError> {
        addresses
            .get(key)
            .ok_or_else(|| ContractError::ContractCallError(format!("Address not found for contract: {}", key)))
            .and_then(|addr_str| {
                addr_str
                    .parse::<Address>()
                    .map_err(|e| ContractError::InvalidAddress(format!("Invalid address for {}: {}", key, e)))
            })
    };

    Ok(ContractAddresses {
        referral_registry: get_address("ReferralRegistry")?,
        wdl_template: get_address("WDLTemplate")?,
    })
}

/// Network configuration for local development
pub fn get_local_network_config() -> NetworkConfig {
    NetworkConfig {
        chain_id: 31337,
        rpc_url: "http://localhost:8545".to_string(),
        ws_url: Some("ws://localhost:8545".to_string()),
        explorer_url: "http://localhost:8545".to_string(),
        native_currency: NativeCurrency {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
    }
}

/// Network configuration for Base Sepolia
pub fn get_base_sepolia_network_config() -> NetworkConfig {
    NetworkConfig {
        chain_id: 84532,
        rpc_url: "https://sepolia.base.org".to_string(),
        ws_url: None,
        explorer_url: "https://sepolia.basescan.org".to_string(),
        native_currency: NativeCurrency {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        },
    }
}

/// Get network configuration by chain ID
pub fn get_network_config_by_chain_id(chain_id: u64) -> Result<NetworkConfig, ContractError> {
    match chain_id {
        31337 => Ok(get_local_network_config()),
        84532 => Ok(get_base_sepolia_network_config()),
        _ => Err(ContractError::UnsupportedChain(chain_id)),
    }
}

/// Get contract addresses by chain ID
pub fn get_contract_addresses_by_chain_id(chain_id: u64) -> Result<ContractAddresses, ContractError> {
    match chain_id {
        31337 => load_local_addresses(),
        84532 => load_base_sepolia_addresses(),
        _ => Err(ContractError::UnsupportedChain(chain_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_addresses_fall_back_to_defaults() {
        let addresses = load_local_addresses().unwrap();
        assert_ne!(addresses.referral_registry, Address::zero());
        assert_ne!(addresses.wdl_template, Address::zero());
        assert_ne!(addresses.referral_registry, addresses.wdl_template);
    }

    #[test]
    fn unknown_chain_is_rejected() {
        assert!(matches!(
            get_network_config_by_chain_id(1),
            Err(ContractError::UnsupportedChain(1))
        ));
        assert!(matches!(
            get_contract_addresses_by_chain_id(999),
            Err(ContractError::UnsupportedChain(999))
        ));
    }

    #[test]
    fn json_addresses_convert() {
        let mut map = HashMap::new();
        map.insert(
            "ReferralRegistry".to_string(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
        );
        map.insert(
            "WDLTemplate".to_string(),
            "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".to_string(),
        );
        let addresses = convert_json_to_addresses(map).unwrap();
        assert_eq!(
            addresses.referral_registry,
            "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn missing_key_is_an_error() {
        let mut map = HashMap::new();
        map.insert(
            "ReferralRegistry".to_string(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
        );
        assert!(convert_json_to_addresses(map).is_err());
    }
}
