use ethers::types::H256;
use sha3::{Digest, Keccak256};

/// Calculate the keccak256 hash of an event signature
pub fn calculate_event_signature(event_signature: &str) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(event_signature.as_bytes());
    let result = hasher.finalize();
    format!("0x{}", hex::encode(result))
}

/// Calculate the topic0 hash of an event signature
pub fn calculate_event_topic(event_signature: &str) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(event_signature.as_bytes());
    H256::from_slice(&hasher.finalize())
}

/// Canonical event signatures for the WDL contracts
pub mod event_signatures {
    use super::*;

    // ReferralRegistry
    pub const REFERRER_SET: &str = "ReferrerSet(address,address)";
    pub const REWARD_ACCRUED: &str = "RewardAccrued(address,address,address,uint256)";
    pub const REWARDS_CLAIMED: &str = "RewardsClaimed(address,uint256)";
    pub const MARKET_REGISTERED: &str = "MarketRegistered(address)";
    pub const REWARD_RATE_UPDATED: &str = "RewardRateUpdated(uint16,uint16)";

    // WDLTemplate
    pub const SHARES_PURCHASED: &str = "SharesPurchased(address,uint8,uint256,uint256,uint256)";
    pub const SHARES_SOLD: &str = "SharesSold(address,uint8,uint256,uint256)";
    pub const MARKET_PAUSED: &str = "MarketPaused(address)";
    pub const MARKET_UNPAUSED: &str = "MarketUnpaused(address)";
    pub const TRADING_CLOSED: &str = "TradingClosed(uint64)";
    pub const MARKET_RESOLVED: &str = "MarketResolved(uint8,address)";
    pub const DISPUTE_RAISED: &str = "DisputeRaised(address,uint256)";
    pub const DISPUTE_SETTLED: &str = "DisputeSettled(uint8)";
    pub const MARKET_FINALIZED: &str = "MarketFinalized(uint8)";
    pub const WINNINGS_CLAIMED: &str = "WinningsClaimed(address,uint256)";

    /// All registry event signatures
    pub fn registry_signatures() -> Vec<&'static str> {
        vec![
            REFERRER_SET,
            REWARD_ACCRUED,
            REWARDS_CLAIMED,
            MARKET_REGISTERED,
            REWARD_RATE_UPDATED,
        ]
    }

    /// All market event signatures
    pub fn market_signatures() -> Vec<&'static str> {
        vec![
            SHARES_PURCHASED,
            SHARES_SOLD,
            MARKET_PAUSED,
            MARKET_UNPAUSED,
            TRADING_CLOSED,
            MARKET_RESOLVED,
            DISPUTE_RAISED,
            DISPUTE_SETTLED,
            MARKET_FINALIZED,
            WINNINGS_CLAIMED,
        ]
    }

    /// Get all known event signatures with their computed topic0 hashes
    pub fn all_signatures() -> Vec<(String, &'static str)> {
        registry_signatures()
            .into_iter()
            .chain(market_signatures())
            .map(|sig| (calculate_event_signature(sig), sig))
            .collect()
    }
}

/// Event signature matcher that resolves topic0 hashes to event names
pub struct EventMatcher {
    known_signatures: Vec<(String, String)>, // (topic0 hex, event signature)
}

impl EventMatcher {
    pub fn new() -> Self {
        let known_signatures = event_signatures::all_signatures()
            .into_iter()
            .map(|(hash, name)| (hash, name.to_string()))
            .collect();

        Self { known_signatures }
    }

    /// Add a custom event signature
    pub fn add_signature(&mut self, event_signature: &str) {
        let hash = calculate_event_signature(event_signature);
        self.known_signatures.push((hash, event_signature.to_string()));
    }

    /// Match a topic0 hash to its event signature
    pub fn match_signature(&self, topic0: &str) -> Option<&str> {
        self.known_signatures
            .iter()
            .find(|(hash, _)| hash == topic0)
            .map(|(_, name)| name.as_str())
    }

    pub fn is_known_signature(&self, topic0: &str) -> bool {
        self.known_signatures.iter().any(|(hash, _)| hash == topic0)
    }
}

impl Default for EventMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_signature_calculation() {
        // ERC-20 Transfer is the canonical reference vector
        let signature = calculate_event_signature("Transfer(address,address,uint256)");
        assert_eq!(
            signature,
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );

        let signature = calculate_event_signature(event_signatures::REFERRER_SET);
        assert_eq!(
            signature,
            "0x5f7165288eef601591cf549e15ff19ef9060b7f71b9c115be946fa1fe7ebf68a"
        );

        let signature = calculate_event_signature(event_signatures::SHARES_PURCHASED);
        assert_eq!(
            signature,
            "0x147bf52ed081eb70e3456a85706c4d53fbf81acdf8bf887c96d2d8c122449524"
        );
    }

    #[test]
    fn test_topic_matches_signature_hex() {
        let topic = calculate_event_topic(event_signatures::MARKET_RESOLVED);
        let hex_form = calculate_event_signature(event_signatures::MARKET_RESOLVED);
        assert_eq!(format!("{:?}", topic), hex_form);
    }

    #[test]
    fn test_event_matcher() {
        let mut matcher = EventMatcher::new();

        let shares_purchased = calculate_event_signature(event_signatures::SHARES_PURCHASED);
        assert!(matcher.is_known_signature(&shares_purchased));
        assert_eq!(
            matcher.match_signature(&shares_purchased),
            Some(event_signatures::SHARES_PURCHASED)
        );

        // All signatures are distinct
        let mut hashes: Vec<String> = event_signatures::all_signatures()
            .into_iter()
            .map(|(hash, _)| hash)
            .collect();
        let total = hashes.len();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), total);

        // Custom signature
        matcher.add_signature("CustomEvent(uint256,address)");
        let custom = calculate_event_signature("CustomEvent(uint256,address)");
        assert!(matcher.is_known_signature(&custom));
    }
}
