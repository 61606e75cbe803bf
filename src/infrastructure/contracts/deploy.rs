use ethers::{
    abi::Abi,
    contract::{Contract, ContractFactory},
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Bytes},
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::domain::models::{DeployMarketRequest, DeployMarketResponse};
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::config::get_gas_limit_for_operation;
use crate::infrastructure::contracts::registry_client::{ensure_success, ChainClient};

/// Foundry build artifact, as written to `out/<Name>.sol/<Name>.json`
#[derive(Debug, Deserialize)]
struct FoundryArtifact {
    abi: serde_json::Value,
    bytecode: ArtifactBytecode,
}

#[derive(Debug, Deserialize)]
struct ArtifactBytecode {
    object: String,
}

/// Deploys WDLTemplate instances (and the registry) from Foundry artifacts
pub struct MarketDeployer {
    client: Arc<ChainClient>,
    wallet: LocalWallet,
    artifact_dir: PathBuf,
}

impl MarketDeployer {
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        chain_id: u64,
        artifact_dir: impl Into<PathBuf>,
    ) -> Result<Self, ContractError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| ContractError::MissingPrivateKey { reason: e.to_string() })?
            .with_chain_id(chain_id);

        let client = Arc::new(SignerMiddleware::new(provider, wallet.clone()));

        Ok(Self {
            client,
            wallet,
            artifact_dir: artifact_dir.into(),
        })
    }

    pub fn wallet_address(&self) -> Address {
        self.wallet.address()
    }

    /// Deploy the ReferralRegistry contract
    pub async fn deploy_registry(&self, reward_bps: u16) -> Result<Address, ContractError> {
        let (abi, bytecode) = self.load_artifact("ReferralRegistry.json")?;

        let factory = ContractFactory::new(abi, bytecode, self.client.clone());
        let deployer = factory
            .deploy((reward_bps,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?;

        let (contract, receipt) = deployer
            .send_with_receipt()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        ensure_success(&receipt)?;
        info!("Deployed ReferralRegistry at {:?}", contract.address());

        Ok(contract.address())
    }

    /// Deploy and initialize a WDLTemplate market instance for one fixture
    pub async fn deploy_market(
        &self,
        request: DeployMarketRequest,
        registry: Address,
    ) -> Result<DeployMarketResponse, ContractError> {
        let (abi, bytecode) = self.load_artifact("WDLTemplate.json")?;

        let factory = ContractFactory::new(abi.clone(), bytecode, self.client.clone());
        let deployer = factory
            .deploy(())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?;

        let (contract, receipt) = deployer
            .send_with_receipt()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        ensure_success(&receipt)?;
        let market = contract.address();
        info!("Deployed WDLTemplate for {} at {:?}", request.fixture_id, market);

        self.initialize_market(&abi, market, &request, registry).await?;

        Ok(DeployMarketResponse {
            market: Arc::from(format!("{:?}", market)),
            fixture_id: request.fixture_id,
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    async fn initialize_market(
        &self,
        abi: &Abi,
        market: Address,
        request: &DeployMarketRequest,
        registry: Address,
    ) -> Result<(), ContractError> {
        let contract = Contract::new(market, abi.clone(), self.client.clone());

        let call = contract
            .method::<_, ()>(
                "initialize",
                (
                    request.fixture_id.to_string(),
                    request.close_time,
                    request.dispute_window_secs,
                    registry,
                    request.fee_bps,
                ),
            )
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .gas(get_gas_limit_for_operation("deploy_market")?);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)
    }

    fn load_artifact(&self, filename: &str) -> Result<(Abi, Bytes), ContractError> {
        let path = self.artifact_dir.join(filename);
        load_artifact_from_path(&path)
    }
}

/// Parse a Foundry artifact into its ABI and creation bytecode
pub fn load_artifact_from_path(path: &Path) -> Result<(Abi, Bytes), ContractError> {
    let content = fs::read_to_string(path).map_err(|e| ContractError::ArtifactError {
        reason: format!("Failed to read artifact {}: {}", path.display(), e),
    })?;

    let artifact: FoundryArtifact =
        serde_json::from_str(&content).map_err(|e| ContractError::ArtifactError {
            reason: format!("Failed to parse artifact {}: {}", path.display(), e),
        })?;

    let abi: Abi = serde_json::from_value(artifact.abi).map_err(|e| ContractError::ArtifactError {
        reason: format!("Invalid ABI in artifact {}: {}", path.display(), e),
    })?;

    let raw = artifact.bytecode.object;
    let hex_str = raw.strip_prefix("0x").unwrap_or(&raw);
    let bytes = hex::decode(hex_str).map_err(|e| ContractError::ArtifactError {
        reason: format!("Invalid bytecode in artifact {}: {}", path.display(), e),
    })?;

    Ok((abi, Bytes::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn artifact_parses_abi_and_bytecode() {
        let artifact = r#"{
            "abi": [
                {
                    "type": "function",
                    "name": "status",
                    "inputs": [],
                    "outputs": [{ "name": "", "type": "uint8" }],
                    "stateMutability": "view"
                }
            ],
            "bytecode": { "object": "0x6080604052" }
        }"#;

        let dir = std::env::temp_dir().join("wdl-artifact-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Sample.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(artifact.as_bytes()).unwrap();

        let (abi, bytecode) = load_artifact_from_path(&path).unwrap();
        assert!(abi.function("status").is_ok());
        assert_eq!(bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let path = Path::new("does/not/exist.json");
        assert!(matches!(
            load_artifact_from_path(path),
            Err(ContractError::ArtifactError { .. })
        ));
    }
}
