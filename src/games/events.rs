//! Append-only log of observable ledger events.

use crate::games::types::{Address, Amount, BetId, RequestId, Selector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WagerEvent {
    BetPlaced {
        bet_id: BetId,
        request_id: RequestId,
        player: Address,
        selectors: Vec<Selector>,
        bet_amount: Amount,
    },
    RandomnessFulfilled {
        request_id: RequestId,
        bet_id: BetId,
        outcome: u8,
    },
    RewardClaimed {
        player: Address,
        bet_id: BetId,
        amount: Amount,
    },
    Funded {
        from: Address,
        amount: Amount,
    },
    OracleFeesDeposited {
        amount: Amount,
    },
    OracleFeesWithdrawn {
        to: Address,
        amount: Amount,
    },
}

impl WagerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WagerEvent::BetPlaced { .. } => "BetPlaced",
            WagerEvent::RandomnessFulfilled { .. } => "RandomnessFulfilled",
            WagerEvent::RewardClaimed { .. } => "RewardClaimed",
            WagerEvent::Funded { .. } => "Funded",
            WagerEvent::OracleFeesDeposited { .. } => "OracleFeesDeposited",
            WagerEvent::OracleFeesWithdrawn { .. } => "OracleFeesWithdrawn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_keyed_by_name() {
        let event = WagerEvent::RewardClaimed {
            player: Address::from_label("alice"),
            bet_id: 4,
            amount: 2_000,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["reward_claimed"]["bet_id"], 4);
        assert_eq!(event.name(), "RewardClaimed");
    }

    #[test]
    fn test_amounts_above_u64_survive_json() {
        let amount: Amount = u64::MAX as Amount * 1_000 + 7;
        let events = vec![
            WagerEvent::Funded { from: Address::from_label("house"), amount },
            WagerEvent::OracleFeesWithdrawn { to: Address::from_label("owner"), amount },
        ];

        let json = serde_json::to_string(&events).unwrap();
        let decoded: Vec<WagerEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, events);
    }
}
