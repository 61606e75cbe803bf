use ethers::abi::Abi;

use crate::domain::services::ContractError;

// ABI JSON is embedded at compile time so the crate carries its own
// description of the contract surface.

const REFERRAL_REGISTRY_ABI: &str = include_str!("referral_registry.json");
const WDL_TEMPLATE_ABI: &str = include_str!("wdl_template.json");

pub fn load_referral_registry_abi() -> Result<Abi, ContractError> {
    parse_abi("ReferralRegistry", REFERRAL_REGISTRY_ABI)
}

pub fn load_wdl_template_abi() -> Result<Abi, ContractError> {
    parse_abi("WDLTemplate", WDL_TEMPLATE_ABI)
}

fn parse_abi(name: &str, json: &str) -> Result<Abi, ContractError> {
    serde_json::from_str(json)
        .map_err(|e| ContractError::ContractCallError(format!("Failed to parse {} ABI: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_registry_abi_parses() {
        let abi = load_referral_registry_abi().unwrap();
        for name in [
            "setReferrer",
            "referrerOf",
            "claimRewards",
            "registerMarket",
            "accrueReward",
            "rewardBps",
        ] {
            assert!(abi.function(name).is_ok(), "missing function {}", name);
        }
        for name in ["ReferrerSet", "RewardAccrued", "RewardsClaimed", "MarketRegistered"] {
            assert!(abi.event(name).is_ok(), "missing event {}", name);
        }
    }

    #[test]
    fn wdl_template_abi_parses() {
        let abi = load_wdl_template_abi().unwrap();
        for name in [
            "initialize",
            "buyShares",
            "sellShares",
            "quoteBuy",
            "quoteSell",
            "status",
            "resolve",
            "raiseDispute",
            "settleDispute",
            "finalize",
            "claim",
        ] {
            assert!(abi.function(name).is_ok(), "missing function {}", name);
        }
        for name in [
            "SharesPurchased",
            "SharesSold",
            "MarketResolved",
            "DisputeRaised",
            "WinningsClaimed",
        ] {
            assert!(abi.event(name).is_ok(), "missing event {}", name);
        }
    }

    #[test]
    fn buy_shares_is_payable() {
        let abi = load_wdl_template_abi().unwrap();
        let f = abi.function("buyShares").unwrap();
        assert_eq!(f.state_mutability, ethers::abi::StateMutability::Payable);
        assert_eq!(f.inputs.len(), 3);
    }
}
