use ethers::{
    abi::{self, Abi, ParamType},
    contract::Contract,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TransactionReceipt, U256},
    utils::parse_ether,
};
use std::sync::Arc;

use crate::domain::models::{
    BuySharesRequest, BuySharesResponse, ClaimWinningsRequest, ClaimWinningsResponse,
    RaiseDisputeRequest, RaiseDisputeResponse, ResolveMarketRequest, ResolveMarketResponse,
    SellSharesRequest, SellSharesResponse, SettleDisputeRequest, SettleDisputeResponse,
};
use crate::domain::services::ContractError;
use crate::infrastructure::contracts::abis;
use crate::infrastructure::contracts::config::get_gas_limit_for_operation;
use crate::infrastructure::contracts::event_utils::{calculate_event_topic, event_signatures};
use crate::infrastructure::contracts::registry_client::{ensure_success, ChainClient};
use crate::infrastructure::contracts::types::{MarketStatus, MarketSummary, Outcome};

/// Typed client for WDLTemplate market instances.
///
/// Bound to one market address; `at` rebinds the same signer to another
/// instance, and transact methods accept any market address in the request.
#[derive(Clone)]
pub struct WdlMarketClient {
    provider: Arc<Provider<Http>>,
    wallet: LocalWallet,
    client: Arc<ChainClient>,
    abi: Abi,
    address: Address,
    contract: Contract<ChainClient>,
}

impl WdlMarketClient {
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        chain_id: u64,
        market: Address,
    ) -> Result<Self, ContractError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ContractError::RpcError(e.to_string()))?;

        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| ContractError::MissingPrivateKey { reason: e.to_string() })?
            .with_chain_id(chain_id);

        let client = Arc::new(SignerMiddleware::new(provider.clone(), wallet.clone()));

        let abi = abis::load_wdl_template_abi()?;
        let contract = Contract::new(market, abi.clone(), client.clone());

        Ok(Self {
            provider: Arc::new(provider),
            wallet,
            client,
            abi,
            address: market,
            contract,
        })
    }

    /// Rebind this client to another market instance
    pub fn at(&self, market: Address) -> Self {
        Self {
            provider: self.provider.clone(),
            wallet: self.wallet.clone(),
            client: self.client.clone(),
            abi: self.abi.clone(),
            address: market,
            contract: Contract::new(market, self.abi.clone(), self.client.clone()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn wallet_address(&self) -> Address {
        self.wallet.address()
    }

    fn bind(&self, market: Address) -> Contract<ChainClient> {
        Contract::new(market, self.abi.clone(), self.client.clone())
    }

    // ============ VIEW OPERATIONS ============

    pub async fn status(&self) -> Result<MarketStatus, ContractError> {
        let raw = self
            .contract
            .method::<_, u8>("status", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?;
        MarketStatus::try_from(raw)
    }

    pub async fn fixture_id(&self) -> Result<String, ContractError> {
        self.contract
            .method::<_, String>("fixtureId", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn close_time(&self) -> Result<u64, ContractError> {
        self.contract
            .method::<_, u64>("closeTime", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn dispute_deadline(&self) -> Result<u64, ContractError> {
        self.contract
            .method::<_, u64>("disputeDeadline", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn fee_bps(&self) -> Result<u16, ContractError> {
        self.contract
            .method::<_, u16>("feeBps", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn result(&self) -> Result<Outcome, ContractError> {
        let raw = self
            .contract
            .method::<_, u8>("result", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?;
        Outcome::try_from(raw)
    }

    pub async fn price(&self, outcome: Outcome) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("price", (outcome.as_u8(),))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn pool(&self, outcome: Outcome) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("pool", (outcome.as_u8(),))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn total_liquidity(&self) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("totalLiquidity", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn shares_of(&self, account: Address, outcome: Outcome) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("sharesOf", (account, outcome.as_u8()))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn quote_buy(&self, outcome: Outcome, amount_in: U256) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("quoteBuy", (outcome.as_u8(), amount_in))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .call()
            .await
            .map_err(|e| ContractError::ContractCallError(e.to_string()))
    }

    pub async fn quote_sell(&self, outcome: Outcome, shares: U256) -> Result<U256, ContractError> {
        self.contract
            .method::<_, U256>("quoteSell", (outcome.as_u8(), shares))
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

    /// Assemble the full market view from individual calls
    pub async fn market_summary(&self) -> Result<MarketSummary, ContractError> {
        let status = self.status().await?;
        let fixture_id = self.fixture_id().await?;
        let close_time = self.close_time().await?;
        let dispute_deadline = self.dispute_deadline().await?;
        let fee_bps = self.fee_bps().await?;
        let total_liquidity = self.total_liquidity().await?;

        let result = match status {
            MarketStatus::Resolved | MarketStatus::Disputed | MarketStatus::Finalized => {
                Some(self.result().await?)
            }
            _ => None,
        };

        let outcomes = [Outcome::Win, Outcome::Draw, Outcome::Lose];
        let mut pools: Vec<Arc<str>> = Vec::with_capacity(3);
        let mut prices: Vec<Arc<str>> = Vec::with_capacity(3);
        for outcome in outcomes {
            pools.push(Arc::from(self.pool(outcome).await?.to_string()));
            prices.push(Arc::from(self.price(outcome).await?.to_string()));
        }

        Ok(MarketSummary {
            address: Arc::from(format!("{:?}", self.address)),
            fixture_id: Arc::from(fixture_id),
            status,
            close_time,
            dispute_deadline,
            fee_bps,
            result,
            pools: [pools[0].clone(), pools[1].clone(), pools[2].clone()],
            prices: [prices[0].clone(), prices[1].clone(), prices[2].clone()],
            total_liquidity: Arc::from(total_liquidity.to_string()),
        })
    }

    // ============ TRADE OPERATIONS ============

    /// Buy outcome shares with native currency
    pub async fn buy_shares(&self, request: BuySharesRequest) -> Result<BuySharesResponse, ContractError> {
        let market = request
            .market
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;
        let outcome = Outcome::try_from(request.outcome)?;

        let amount_in = parse_ether(request.amount_eth.as_ref())
            .map_err(|e| ContractError::ContractCallError(format!("Invalid amount: {}", e)))?;

        let min_shares_out = match &request.min_shares_out {
            Some(raw) => U256::from_dec_str(raw)
                .map_err(|e| ContractError::ContractCallError(format!("Invalid minimum shares: {}", e)))?,
            None => U256::zero(),
        };

        let referrer = match &request.referrer {
            Some(raw) => raw
                .parse::<Address>()
                .map_err(|e| ContractError::InvalidAddress(e.to_string()))?,
            None => Address::zero(),
        };

        let contract = self.bind(market);
        let call = contract
            .method::<_, U256>("buyShares", (outcome.as_u8(), min_shares_out, referrer))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .value(amount_in)
            .gas(get_gas_limit_for_operation("buy_shares")?);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)?;

        let (shares_out, fee) = self.extract_purchase_from_receipt(market, &receipt)?;

        Ok(BuySharesResponse {
            market: request.market,
            buyer: Arc::from(format!("{:?}", self.wallet.address())),
            outcome: outcome.as_u8(),
            amount_in_wei: Arc::from(amount_in.to_string()),
            shares_out: Arc::from(shares_out.to_string()),
            fee_wei: Arc::from(fee.to_string()),
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    /// Sell outcome shares back into the pool
    pub async fn sell_shares(&self, request: SellSharesRequest) -> Result<SellSharesResponse, ContractError> {
        let market = request
            .market
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;
        let outcome = Outcome::try_from(request.outcome)?;

        let shares = U256::from_dec_str(&request.shares)
            .map_err(|e| ContractError::ContractCallError(format!("Invalid shares: {}", e)))?;

        let min_amount_out = match &request.min_amount_out {
            Some(raw) => U256::from_dec_str(raw)
                .map_err(|e| ContractError::ContractCallError(format!("Invalid minimum amount: {}", e)))?,
            None => U256::zero(),
        };

        let contract = self.bind(market);
        let call = contract
            .method::<_, U256>("sellShares", (outcome.as_u8(), shares, min_amount_out))
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .gas(get_gas_limit_for_operation("sell_shares")?);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)?;

        let amount_out = self.extract_sale_from_receipt(market, &receipt)?;

        Ok(SellSharesResponse {
            market: request.market,
            seller: Arc::from(format!("{:?}", self.wallet.address())),
            outcome: outcome.as_u8(),
            shares_in: Arc::from(shares.to_string()),
            amount_out_wei: Arc::from(amount_out.to_string()),
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    /// Claim winnings after finalization
    pub async fn claim(&self, request: ClaimWinningsRequest) -> Result<ClaimWinningsResponse, ContractError> {
        let market = request
            .market
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;

        let contract = self.bind(market);
        let call = contract
            .method::<_, U256>("claim", ())
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .gas(get_gas_limit_for_operation("claim")?);

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)?;

        let amount = self.extract_uint_event(market, &receipt, event_signatures::WINNINGS_CLAIMED)?;

        Ok(ClaimWinningsResponse {
            market: request.market,
            account: Arc::from(format!("{:?}", self.wallet.address())),
            amount_wei: Arc::from(amount.to_string()),
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    // ============ LIFECYCLE OPERATIONS ============

    /// Report the fixture result. Oracle/operator only.
    pub async fn resolve(&self, request: ResolveMarketRequest) -> Result<ResolveMarketResponse, ContractError> {
        let market = request
            .market
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;
        let outcome = Outcome::try_from(request.outcome)?;

        let receipt = self
            .send_lifecycle_call(market, "resolve", (outcome.as_u8(),), "resolve", U256::zero())
            .await?;

        Ok(ResolveMarketResponse {
            market: request.market,
            result: outcome.as_u8(),
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    /// Challenge a resolution during the dispute window. Requires a bond.
    pub async fn raise_dispute(&self, request: RaiseDisputeRequest) -> Result<RaiseDisputeResponse, ContractError> {
        let market = request
            .market
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;

        let bond = parse_ether(request.bond_eth.as_ref())
            .map_err(|e| ContractError::ContractCallError(format!("Invalid bond: {}", e)))?;

        let receipt = self
            .send_lifecycle_call(market, "raiseDispute", (), "raise_dispute", bond)
            .await?;

        Ok(RaiseDisputeResponse {
            market: request.market,
            challenger: Arc::from(format!("{:?}", self.wallet.address())),
            bond_wei: Arc::from(bond.to_string()),
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    /// Settle a raised dispute with the final result. Operator only.
    pub async fn settle_dispute(&self, request: SettleDisputeRequest) -> Result<SettleDisputeResponse, ContractError> {
        let market = request
            .market
            .parse::<Address>()
            .map_err(|e| ContractError::InvalidAddress(e.to_string()))?;
        let outcome = Outcome::try_from(request.outcome)?;

        let receipt = self
            .send_lifecycle_call(market, "settleDispute", (outcome.as_u8(),), "settle_dispute", U256::zero())
            .await?;

        Ok(SettleDisputeResponse {
            market: request.market,
            result: outcome.as_u8(),
            transaction_hash: Arc::from(format!("{:?}", receipt.transaction_hash)),
            block_number: receipt.block_number.unwrap_or_default().as_u64(),
        })
    }

    pub async fn pause(&self, market: Address) -> Result<TransactionReceipt, ContractError> {
        self.send_lifecycle_call(market, "pause", (), "pause", U256::zero()).await
    }

    pub async fn unpause(&self, market: Address) -> Result<TransactionReceipt, ContractError> {
        self.send_lifecycle_call(market, "unpause", (), "unpause", U256::zero()).await
    }

    pub async fn close_trading(&self, market: Address) -> Result<TransactionReceipt, ContractError> {
        self.send_lifecycle_call(market, "closeTrading", (), "close_trading", U256::zero()).await
    }

    /// Lock in the result once the dispute window has elapsed
    pub async fn finalize(&self, market: Address) -> Result<TransactionReceipt, ContractError> {
        self.send_lifecycle_call(market, "finalize", (), "finalize", U256::zero()).await
    }

    pub async fn wallet_balance(&self) -> Result<U256, ContractError> {
        self.provider
            .get_balance(self.wallet.address(), None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))
    }

    // ============ RECEIPT HELPERS ============

    async fn send_lifecycle_call<T: ethers::abi::Tokenize>(
        &self,
        market: Address,
        method: &str,
        args: T,
        gas_operation: &str,
        value: U256,
    ) -> Result<TransactionReceipt, ContractError> {
        let contract = self.bind(market);
        let mut call = contract
            .method::<_, ()>(method, args)
            .map_err(|e| ContractError::ContractCallError(e.to_string()))?
            .gas(get_gas_limit_for_operation(gas_operation)?);

        if !value.is_zero() {
            call = call.value(value);
        }

        let pending_tx = call
            .send()
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?;

        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| ContractError::TransactionError("No transaction receipt".to_string()))?;

        ensure_success(&receipt)?;
        Ok(receipt)
    }

    /// Extract (sharesOut, fee) from a SharesPurchased log in the receipt
    fn extract_purchase_from_receipt(
        &self,
        market: Address,
        receipt: &TransactionReceipt,
    ) -> Result<(U256, U256), ContractError> {
        let topic0 = calculate_event_topic(event_signatures::SHARES_PURCHASED);

        for log in &receipt.logs {
            if log.address != market || log.topics.first() != Some(&topic0) {
                continue;
            }

            let tokens = abi::decode(
                &[ParamType::Uint(256), ParamType::Uint(256), ParamType::Uint(256)],
                &log.data,
            )
            .map_err(|e| ContractError::DecodeError(e.to_string()))?;

            let mut values = tokens.into_iter().filter_map(|t| t.into_uint());
            let _amount_in = values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesPurchased amountIn missing".to_string()))?;
            let shares_out = values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesPurchased sharesOut missing".to_string()))?;
            let fee = values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesPurchased fee missing".to_string()))?;
            return Ok((shares_out, fee));
        }

        Err(ContractError::DecodeError(
            "SharesPurchased event not found in receipt".to_string(),
        ))
    }

    /// Extract amountOut from a SharesSold log in the receipt
    fn extract_sale_from_receipt(
        &self,
        market: Address,
        receipt: &TransactionReceipt,
    ) -> Result<U256, ContractError> {
        let topic0 = calculate_event_topic(event_signatures::SHARES_SOLD);

        for log in &receipt.logs {
            if log.address != market || log.topics.first() != Some(&topic0) {
                continue;
            }

            let tokens = abi::decode(&[ParamType::Uint(256), ParamType::Uint(256)], &log.data)
                .map_err(|e| ContractError::DecodeError(e.to_string()))?;

            return tokens
                .into_iter()
                .filter_map(|t| t.into_uint())
                .nth(1)
                .ok_or_else(|| ContractError::DecodeError("SharesSold amountOut missing".to_string()));
        }

        Err(ContractError::DecodeError(
            "SharesSold event not found in receipt".to_string(),
        ))
    }

    /// Extract the single uint payload of an event like WinningsClaimed
    fn extract_uint_event(
        &self,
        market: Address,
        receipt: &TransactionReceipt,
        signature: &str,
    ) -> Result<U256, ContractError> {
        let topic0 = calculate_event_topic(signature);

        for log in &receipt.logs {
            if log.address != market || log.topics.first() != Some(&topic0) {
                continue;
            }

            let tokens = abi::decode(&[ParamType::Uint(256)], &log.data)
                .map_err(|e| ContractError::DecodeError(e.to_string()))?;
            return tokens
                .into_iter()
                .next()
                .and_then(|t| t.into_uint())
                .ok_or_else(|| ContractError::DecodeError(format!("{} amount missing", signature)));
        }

        Err(ContractError::DecodeError(format!(
            "{} event not found in receipt",
            signature
        )))
    }
}
