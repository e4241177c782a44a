//! Bet ledger: every bet ever placed plus each player's bet history.
//!
//! Ids are dense from 1, so records live in a `Vec` at `bet_id - 1`. Only
//! the controller mutates records; everyone else gets shared references.

use crate::errors::StorageError;
use crate::games::types::{Address, Amount, BetId, BetRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetLedger {
    bets: Vec<BetRecord>,
    player_bets: BTreeMap<Address, Vec<BetId>>,
}

impl BetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next inserted bet will receive
    pub fn next_bet_id(&self) -> BetId {
        self.bets.len() as BetId + 1
    }

    /// Highest allocated id, 0 when empty
    pub fn last_bet_id(&self) -> BetId {
        self.bets.len() as BetId
    }

    pub(crate) fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn get(&self, bet_id: BetId) -> Option<&BetRecord> {
        let index = bet_id.checked_sub(1)?;
        self.bets.get(index as usize)
    }

    pub(crate) fn get_mut(&mut self, bet_id: BetId) -> Option<&mut BetRecord> {
        let index = bet_id.checked_sub(1)?;
        self.bets.get_mut(index as usize)
    }

    /// Append a freshly allocated record and index it under its player.
    ///
    /// The record must carry `next_bet_id()`.
    pub(crate) fn insert(&mut self, record: BetRecord) -> BetId {
        debug_assert_eq!(record.bet_id, self.next_bet_id());
        let bet_id = record.bet_id;
        self.player_bets.entry(record.player).or_default().push(bet_id);
        self.bets.push(record);
        bet_id
    }

    /// Record the settlement result for an unsettled bet
    pub(crate) fn record_outcome(&mut self, bet_id: BetId, outcome: u8, reward: Amount) -> bool {
        match self.get_mut(bet_id) {
            Some(record) if !record.is_settled => {
                record.outcome = Some(outcome);
                record.reward_amount = reward;
                record.is_settled = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn mark_claimed(&mut self, bet_id: BetId) -> bool {
        match self.get_mut(bet_id) {
            Some(record) if record.is_claimable() => {
                record.is_claimed = true;
                true
            }
            _ => false,
        }
    }

    /// Bet ids placed by `player`, oldest first
    pub fn player_bet_ids(&self, player: &Address) -> &[BetId] {
        self.player_bets.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn player_bet_at(&self, player: &Address, index: usize) -> Option<BetId> {
        self.player_bet_ids(player).get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BetRecord> {
        self.bets.iter()
    }

    /// Sum of settled, unclaimed rewards still owed to players
    pub fn outstanding_rewards(&self) -> Amount {
        self.bets
            .iter()
            .filter(|record| record.is_claimable())
            .fold(0, |acc: Amount, record| acc.saturating_add(record.reward_amount))
    }

    /// Check the structural invariants of a ledger loaded from outside
    pub fn verify_integrity(&self) -> Result<(), StorageError> {
        let corrupt = |reason: String| Err(StorageError::CorruptedData(reason));
        for (index, record) in self.bets.iter().enumerate() {
            let expected = index as BetId + 1;
            if record.bet_id != expected {
                return corrupt(format!("bet at position {} has id {}", expected, record.bet_id));
            }
            if record.selectors.is_empty() {
                return corrupt(format!("bet {} has no selections", record.bet_id));
            }
            if !record.is_settled && (record.outcome.is_some() || record.reward_amount != 0) {
                return corrupt(format!("bet {} has a result but is not settled", record.bet_id));
            }
            if record.is_claimed && !(record.is_settled && record.reward_amount > 0) {
                return corrupt(format!("bet {} is claimed without a reward", record.bet_id));
            }
            if !self.player_bet_ids(&record.player).contains(&record.bet_id) {
                return corrupt(format!("bet {} missing from player history", record.bet_id));
            }
        }

        let indexed: usize = self.player_bets.values().map(Vec::len).sum();
        if indexed != self.bets.len() {
            return corrupt(format!(
                "player history indexes {} bets, ledger holds {}",
                indexed,
                self.bets.len()
            ));
        }
        Ok(())
    }
}
