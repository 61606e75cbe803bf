use ethers::{
    abi::{self, ParamType},
    contract::Contract,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TransactionReceipt, U256},
};
use std::sync::Arc;

use crate::domain::models::{
    ClaimRewardsResponse, RegisterMarketRequest, RegisterMarketResponse, SetReferrerRequest,
    SetReferrerResponse,
};
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::abis;
use crate::infrastructure::contracts::config::get_gas_limit_for_operation;
use crate::infrastructure::contracts::event_utils::{calculate_event_topic, event_signatures};
use crate::infrastructure::contracts::types::ReferralSummary;

pub type ChainClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Typed client for the ReferralRegistry contract
#[derive(Clone)]
pub struct ReferralRegistryClient {
    provider: Arc<Provider<Http>>,
    wallet: LocalWallet,
    address: Address,
    contract: Contract<ChainClient>,
}

impl ReferralRegistryClient {
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        chain_id: u64,
        address: Address,
    ) -> Result<Self, ContractError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| ContractError::MissingPrivateKey { reason: e.to_string() })?
            .with_chain_id(chain_id);

        let client = Arc::new(SignerMiddleware::new(provider.clone(), wallet.clone()));

        let abi = abis::load_referral_registry_abi()?;
        let contract = Contract::new(address, abi, client);

        Ok(Self {
            provider: Arc::new(provider),
            wallet,
            address,
            contract,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn wallet_address(&self) -> Address {
        self.wallet.address()
    }

    pub fn provider(&self) -> Arc<Provider<Http>> {
        self.provider.clone()
    }

    // ============ VIEW OPERATIONS ============

    pub async fn referrer_of(&self, user: Address) -> Result<Address, ContractError> {
        self.contract
            .method::<_, Address>("referrerOf", (user,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn referred_count(&self, referrer: Address) -> Result<u64, ContractError> {
        let count = self
            .contract
            .method::<_, U256>("referredCount", (referrer,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?;
        Ok(count.min(U256::from(u64::MAX)).as_u64())
    }

    pub async fn reward_balance(&self, referrer: Address) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("rewardBalance", (referrer,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn total_accrued(&self, referrer: Address) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("totalAccrued", (referrer,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn reward_bps(&self) -> Result<u16, ContractError> {
        self.contract
            .method::<_, u16>("rewardBps", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn is_market(&self, account: Address) -> Result<bool, ContractError> {
        self.contract
            .method::<_, bool>("isMarket", (account,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn owner(&self) -> Result<Address, ContractError> {
        self.contract
            .method::<_, Address>("owner", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    /// Assemble the full referral standing for one referrer
    pub async fn referral_summary(&self, referrer: Address) -> Result<ReferralSummary, ContractError> {
        let referred_count = self.referred_count(referrer).await?;
        let reward_balance = self.reward_balance(referrer).await?;
        let total_accrued = self.total_accrued(referrer).await?;
        let reward_bps = self.reward_bps().await?;

        Ok(ReferralSummary {
            referrer: Arc::from(format!("{:?}", referrer)),
            referred_count,
            reward_balance_wei: Arc::from(reward_balance.to_string()),
            total_accrued_wei: Arc::from(total_accrued.to_string()),
            reward_bps,
        })
    }

    // ============ TRANSACT OPERATIONS ============

    /// Bind the caller's account to a referrer. One-shot per account.
    pub async fn set_referrer(&self, request: SetReferrerRequest) -> Result<SetReferrerResponse, ContractError> {
        let referrer = request
            .referrer
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;

        let call = self
            .contract
            .method::<_, ()>("setReferrer", (referrer,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .gas(get_gas_limit_for_operation("set_referrer")?);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)?;

        Ok(SetReferrerResponse {
            user: Arc::from(format!("{:?}", self.wallet.address())),
            referrer: request.referrer,
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    /// Withdraw the caller's accrued referral rewards
    pub async fn claim_rewards(&self) -> Result<ClaimRewardsResponse, ContractError> {
        let call = self
            .contract
            .method::<_, U256>("claimRewards", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .gas(get_gas_limit_for_operation("claim_rewards")?);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)?;

        let amount = self.extract_claimed_amount_from_receipt(&receipt)?;

        Ok(ClaimRewardsResponse {
            referrer: Arc::from(format!("{:?}", self.wallet.address())),
            amount_wei: Arc::from(amount.to_string()),
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    /// Authorize a market contract to accrue rewards. Owner only.
    pub async fn register_market(
        &self,
        request: RegisterMarketRequest,
    ) -> Result<RegisterMarketResponse, ContractError> {
        let market = request
            .market
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;

        let call = self
            .contract
            .method::<_, ()>("registerMarket", (market,))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .gas(get_gas_limit_for_operation("register_market")?);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)?;

        Ok(RegisterMarketResponse {
            market: request.market,
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    /// Get wallet balance
    pub async fn wallet_balance(&self) -> Result<U256, ContractError> {
        self.provider
            .get_balance(self.wallet.address(), None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))
    }

    /// Extract the claimed amount from a RewardsClaimed log in the receipt
    fn extract_claimed_amount_from_receipt(&self, receipt: &TransactionReceipt) -> Result<U256, ContractError> {
        let topic0 = calculate_event_topic(event_signatures::REWARDS_CLAIMED);

        for log in &receipt.logs {
            if log.address != self.address {
                continue;
            }
            if log.topics.first() != Some(&topic0) {
                continue;
            }

            let tokens = abi::decode(&[ParamType::Uint(256)], &log.data)
                .map_err(|e| ContractError::DecodeError(e.to_string()))?;
            return tokens
                .into_iter()
                .next()
                .and_then(|t| t.into_uint())
                .ok_or_else(|| ContractError::DecodeError("RewardsClaimed amount missing".to_string()));
        }

        Err(ContractError::DecodeError(
            "RewardsClaimed event not found in receipt".to_string(),
        ))
    }
}

/// Map a reverted transaction to an error
pub(crate) fn ensure_success(receipt: &TransactionReceipt) -> Result<(), ContractError> {
    if let Some(status) = receipt.status {
        if status.is_zero() {
            return Err(ContractError::TransactionError(format!(
                "Transaction reverted: {:?}",
                receipt.transaction_hash
            )));
        }
    }
    Ok(())
}
