use chrono::{DateTime, Utc};
use ethers::{
    abi::{self, ParamType},
    types::{Address, Log, H256, U256},
};
use lazy_static::lazy_static;
use serde::Serialize;

use crate::domain::services::ContractError;
use crate::infrastructure::contracts::event_utils::{calculate_event_topic, event_signatures};
use crate::infrastructure::contracts::types::Outcome;

/// Decoded event from either WDL contract
#[derive(Debug, Clone, Serialize)]
pub enum MarketEvent {
    // ReferralRegistry
    ReferrerSet {
        user: Address,
        referrer: Address,
    },
    RewardAccrued {
        referrer: Address,
        user: Address,
        market: Address,
        amount: U256,
    },
    RewardsClaimed {
        referrer: Address,
        amount: U256,
    },
    MarketRegistered {
        market: Address,
    },
    RewardRateUpdated {
        old_bps: u16,
        new_bps: u16,
    },

    // WDLTemplate
    SharesPurchased {
        buyer: Address,
        outcome: Outcome,
        amount_in: U256,
        shares_out: U256,
        fee: U256,
    },
    SharesSold {
        seller: Address,
        outcome: Outcome,
        shares_in: U256,
        amount_out: U256,
    },
    MarketPaused {
        operator: Address,
    },
    MarketUnpaused {
        operator: Address,
    },
    TradingClosed {
        closed_at: u64,
    },
    MarketResolved {
        result: Outcome,
        oracle: Address,
    },
    DisputeRaised {
        challenger: Address,
        bond: U256,
    },
    DisputeSettled {
        result: Outcome,
    },
    MarketFinalized {
        result: Outcome,
    },
    WinningsClaimed {
        account: Address,
        amount: U256,
    },
}

impl MarketEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MarketEvent::ReferrerSet { .. } => "ReferrerSet",
            MarketEvent::RewardAccrued { .. } => "RewardAccrued",
            MarketEvent::RewardsClaimed { .. } => "RewardsClaimed",
            MarketEvent::MarketRegistered { .. } => "MarketRegistered",
            MarketEvent::RewardRateUpdated { .. } => "RewardRateUpdated",
            MarketEvent::SharesPurchased { .. } => "SharesPurchased",
            MarketEvent::SharesSold { .. } => "SharesSold",
            MarketEvent::MarketPaused { .. } => "MarketPaused",
            MarketEvent::MarketUnpaused { .. } => "MarketUnpaused",
            MarketEvent::TradingClosed { .. } => "TradingClosed",
            MarketEvent::MarketResolved { .. } => "MarketResolved",
            MarketEvent::DisputeRaised { .. } => "DisputeRaised",
            MarketEvent::DisputeSettled { .. } => "DisputeSettled",
            MarketEvent::MarketFinalized { .. } => "MarketFinalized",
            MarketEvent::WinningsClaimed { .. } => "WinningsClaimed",
        }
    }
}

/// Position of a decoded event on chain
#[derive(Debug, Clone, Serialize)]
pub struct EventMeta {
    pub contract: Address,
    pub block_number: u64,
    pub transaction_hash: H256,
    pub log_index: u64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodedEvent {
    pub event: MarketEvent,
    pub meta: EventMeta,
}

lazy_static! {
    static ref TOPIC_REFERRER_SET: H256 = calculate_event_topic(event_signatures::REFERRER_SET);
    static ref TOPIC_REWARD_ACCRUED: H256 = calculate_event_topic(event_signatures::REWARD_ACCRUED);
    static ref TOPIC_REWARDS_CLAIMED: H256 = calculate_event_topic(event_signatures::REWARDS_CLAIMED);
    static ref TOPIC_MARKET_REGISTERED: H256 = calculate_event_topic(event_signatures::MARKET_REGISTERED);
    static ref TOPIC_REWARD_RATE_UPDATED: H256 = calculate_event_topic(event_signatures::REWARD_RATE_UPDATED);
    static ref TOPIC_SHARES_PURCHASED: H256 = calculate_event_topic(event_signatures::SHARES_PURCHASED);
    static ref TOPIC_SHARES_SOLD: H256 = calculate_event_topic(event_signatures::SHARES_SOLD);
    static ref TOPIC_MARKET_PAUSED: H256 = calculate_event_topic(event_signatures::MARKET_PAUSED);
    static ref TOPIC_MARKET_UNPAUSED: H256 = calculate_event_topic(event_signatures::MARKET_UNPAUSED);
    static ref TOPIC_TRADING_CLOSED: H256 = calculate_event_topic(event_signatures::TRADING_CLOSED);
    static ref TOPIC_MARKET_RESOLVED: H256 = calculate_event_topic(event_signatures::MARKET_RESOLVED);
    static ref TOPIC_DISPUTE_RAISED: H256 = calculate_event_topic(event_signatures::DISPUTE_RAISED);
    static ref TOPIC_DISPUTE_SETTLED: H256 = calculate_event_topic(event_signatures::DISPUTE_SETTLED);
    static ref TOPIC_MARKET_FINALIZED: H256 = calculate_event_topic(event_signatures::MARKET_FINALIZED);
    static ref TOPIC_WINNINGS_CLAIMED: H256 = calculate_event_topic(event_signatures::WINNINGS_CLAIMED);
}

/// Decode a raw log from either contract into a typed event.
///
/// Returns `Ok(None)` for logs whose topic0 is not a WDL event; malformed
/// logs for a known topic0 are an error.
pub fn decode_market_event(log: &Log) -> Result<Option<DecodedEvent>, ContractError> {
    let topic0 = match log.topics.first() {
        Some(topic) => *topic,
        None => return Ok(None),
    };

    let event = if topic0 == *TOPIC_REFERRER_SET {
        MarketEvent::ReferrerSet {
            user: address_topic(log, 1)?,
            referrer: address_topic(log, 2)?,
        }
    } else if topic0 == *TOPIC_REWARD_ACCRUED {
        MarketEvent::RewardAccrued {
            referrer: address_topic(log, 1)?,
            user: address_topic(log, 2)?,
            market: address_topic(log, 3)?,
            amount: single_uint(log)?,
        }
    } else if topic0 == *TOPIC_REWARDS_CLAIMED {
        MarketEvent::RewardsClaimed {
            referrer: address_topic(log, 1)?,
            amount: single_uint(log)?,
        }
    } else if topic0 == *TOPIC_MARKET_REGISTERED {
        MarketEvent::MarketRegistered {
            market: address_topic(log, 1)?,
        }
    } else if topic0 == *TOPIC_REWARD_RATE_UPDATED {
        let tokens = abi::decode(&[ParamType::Uint(16), ParamType::Uint(16)], &log.data)
            .map_err(|e| ContractError::DecodeError(e.to_string()))?;
        let mut values = tokens.into_iter().filter_map(|t| t.into_uint());
        MarketEvent::RewardRateUpdated {
            old_bps: values
                .next()
                .ok_or_else(|| ContractError::DecodeError("RewardRateUpdated oldBps missing".to_string()))?
                .low_u32() as u16,
            new_bps: values
                .next()
                .ok_or_else(|| ContractError::DecodeError("RewardRateUpdated newBps missing".to_string()))?
                .low_u32() as u16,
        }
    } else if topic0 == *TOPIC_SHARES_PURCHASED {
        let tokens = abi::decode(
            &[ParamType::Uint(256), ParamType::Uint(256), ParamType::Uint(256)],
            &log.data,
        )
        .map_err(|e| ContractError::DecodeError(e.to_string()))?;
        let mut values = tokens.into_iter().filter_map(|t| t.into_uint());
        MarketEvent::SharesPurchased {
            buyer: address_topic(log, 1)?,
            outcome: outcome_topic(log, 2)?,
            amount_in: values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesPurchased amountIn missing".to_string()))?,
            shares_out: values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesPurchased sharesOut missing".to_string()))?,
            fee: values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesPurchased fee missing".to_string()))?,
        }
    } else if topic0 == *TOPIC_SHARES_SOLD {
        let tokens = abi::decode(&[ParamType::Uint(256), ParamType::Uint(256)], &log.data)
            .map_err(|e| ContractError::DecodeError(e.to_string()))?;
        let mut values = tokens.into_iter().filter_map(|t| t.into_uint());
        MarketEvent::SharesSold {
            seller: address_topic(log, 1)?,
            outcome: outcome_topic(log, 2)?,
            shares_in: values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesSold sharesIn missing".to_string()))?,
            amount_out: values
                .next()
                .ok_or_else(|| ContractError::DecodeError("SharesSold amountOut missing".to_string()))?,
        }
    } else if topic0 == *TOPIC_MARKET_PAUSED {
        MarketEvent::MarketPaused {
            operator: address_topic(log, 1)?,
        }
    } else if topic0 == *TOPIC_MARKET_UNPAUSED {
        MarketEvent::MarketUnpaused {
            operator: address_topic(log, 1)?,
        }
    } else if topic0 == *TOPIC_TRADING_CLOSED {
        let tokens = abi::decode(&[ParamType::Uint(64)], &log.data)
            .map_err(|e| ContractError::DecodeError(e.to_string()))?;
        MarketEvent::TradingClosed {
            closed_at: tokens
                .into_iter()
                .next()
                .and_then(|t| t.into_uint())
                .ok_or_else(|| ContractError::DecodeError("TradingClosed closedAt missing".to_string()))?
                .as_u64(),
        }
    } else if topic0 == *TOPIC_MARKET_RESOLVED {
        MarketEvent::MarketResolved {
            result: outcome_topic(log, 1)?,
            oracle: address_topic(log, 2)?,
        }
    } else if topic0 == *TOPIC_DISPUTE_RAISED {
        MarketEvent::DisputeRaised {
            challenger: address_topic(log, 1)?,
            bond: single_uint(log)?,
        }
    } else if topic0 == *TOPIC_DISPUTE_SETTLED {
        MarketEvent::DisputeSettled {
            result: outcome_topic(log, 1)?,
        }
    } else if topic0 == *TOPIC_MARKET_FINALIZED {
        MarketEvent::MarketFinalized {
            result: outcome_topic(log, 1)?,
        }
    } else if topic0 == *TOPIC_WINNINGS_CLAIMED {
        MarketEvent::WinningsClaimed {
            account: address_topic(log, 1)?,
            amount: single_uint(log)?,
        }
    } else {
        return Ok(None);
    };

    Ok(Some(DecodedEvent {
        event,
        meta: EventMeta {
            contract: log.address,
            block_number: log.block_number.unwrap_or_default().as_u64(),
            transaction_hash: log.transaction_hash.unwrap_or_default(),
            log_index: log.log_index.unwrap_or_default().as_u64(),
            observed_at: Utc::now(),
        },
    }))
}

/// Read an indexed address out of a topic (left-padded to 32 bytes)
fn address_topic(log: &Log, index: usize) -> Result<Address, ContractError> {
    let topic = log.topics.get(index).ok_or_else(|| {
        ContractError::DecodeError(format!("Log has no topic at index {}", index))
    })?;
    Ok(Address::from_slice(&topic.as_bytes()[12..]))
}

/// Read an indexed outcome discriminant out of a topic
fn outcome_topic(log: &Log, index: usize) -> Result<Outcome, ContractError> {
    let topic = log.topics.get(index).ok_or_else(|| {
        ContractError::DecodeError(format!("Log has no topic at index {}", index))
    })?;
    let raw = U256::from_big_endian(topic.as_bytes());
    if raw > U256::from(u8::MAX) {
        return Err(ContractError::DecodeError(format!(
            "Outcome topic out of range: {}",
            raw
        )));
    }
    Outcome::try_from(raw.low_u32() as u8)
}

/// Decode a single uint256 data payload
fn single_uint(log: &Log) -> Result<U256, ContractError> {
    let tokens = abi::decode(&[ParamType::Uint(256)], &log.data)
        .map_err(|e| ContractError::DecodeError(e.to_string()))?;
    tokens
        .into_iter()
        .next()
        .and_then(|t| t.into_uint())
        .ok_or_else(|| ContractError::DecodeError("Expected uint payload".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::Token;
    use ethers::types::Bytes;

    fn address_as_topic(address: Address) -> H256 {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(address.as_bytes());
        H256::from(bytes)
    }

    fn uint_as_topic(value: u64) -> H256 {
        let mut bytes = [0u8; 32];
        U256::from(value).to_big_endian(&mut bytes);
        H256::from(bytes)
    }

    fn sample_log(topics: Vec<H256>, data: Vec<u8>) -> Log {
        Log {
            address: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".parse().unwrap(),
            topics,
            data: Bytes::from(data),
            block_number: Some(42u64.into()),
            transaction_hash: Some(H256::repeat_byte(0x11)),
            log_index: Some(3u64.into()),
            ..Default::default()
        }
    }

    #[test]
    fn decodes_shares_purchased() {
        let buyer: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        let data = abi::encode(&[
            Token::Uint(U256::from(1_000_000u64)),
            Token::Uint(U256::from(900_000u64)),
            Token::Uint(U256::from(5_000u64)),
        ]);

        let log = sample_log(
            vec![
                calculate_event_topic(event_signatures::SHARES_PURCHASED),
                address_as_topic(buyer),
                uint_as_topic(1), // draw
            ],
            data,
        );

        let decoded = decode_market_event(&log).unwrap().unwrap();
        assert_eq!(decoded.meta.block_number, 42);
        match decoded.event {
            MarketEvent::SharesPurchased {
                buyer: b,
                outcome,
                amount_in,
                shares_out,
                fee,
            } => {
                assert_eq!(b, buyer);
                assert_eq!(outcome, Outcome::Draw);
                assert_eq!(amount_in, U256::from(1_000_000u64));
                assert_eq!(shares_out, U256::from(900_000u64));
                assert_eq!(fee, U256::from(5_000u64));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn decodes_referrer_set() {
        let user: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        let referrer: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();

        let log = sample_log(
            vec![
                calculate_event_topic(event_signatures::REFERRER_SET),
                address_as_topic(user),
                address_as_topic(referrer),
            ],
            vec![],
        );

        let decoded = decode_market_event(&log).unwrap().unwrap();
        match decoded.event {
            MarketEvent::ReferrerSet { user: u, referrer: r } => {
                assert_eq!(u, user);
                assert_eq!(r, referrer);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn decodes_market_resolved() {
        let oracle: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();
        let log = sample_log(
            vec![
                calculate_event_topic(event_signatures::MARKET_RESOLVED),
                uint_as_topic(2), // lose
                address_as_topic(oracle),
            ],
            vec![],
        );

        let decoded = decode_market_event(&log).unwrap().unwrap();
        match decoded.event {
            MarketEvent::MarketResolved { result, oracle: o } => {
                assert_eq!(result, Outcome::Lose);
                assert_eq!(o, oracle);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unknown_topic_is_skipped() {
        let log = sample_log(
            vec![calculate_event_topic("Transfer(address,address,uint256)")],
            vec![],
        );
        assert!(decode_market_event(&log).unwrap().is_none());
    }

    #[test]
    fn known_topic_with_missing_topics_is_an_error() {
        // ReferrerSet requires two indexed topics
        let log = sample_log(vec![calculate_event_topic(event_signatures::REFERRER_SET)], vec![]);
        assert!(matches!(
            decode_market_event(&log),
            Err(ContractError::DecodeError(_))
        ));
    }

    #[test]
    fn invalid_outcome_topic_is_an_error() {
        let oracle: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();
        let log = sample_log(
            vec![
                calculate_event_topic(event_signatures::MARKET_RESOLVED),
                uint_as_topic(7),
                address_as_topic(oracle),
            ],
            vec![],
        );
        assert!(decode_market_event(&log).is_err());
    }
}
