//! Wager lifecycle controller
//!
//! Owns the ledger, the request tracker and the pooled balances. Each entry
//! point validates everything up front and only then mutates, so a rejected
//! call leaves the controller exactly as it was.

use crate::errors::{RouletteResult, StorageError, WagerError};
use crate::games::events::WagerEvent;
use crate::games::ledger::BetLedger;
use crate::games::payout::PayoutTable;
use crate::games::request_tracker::{RandomnessRequest, RandomnessRequestTracker, RequestEntry};
use crate::games::settlement;
use crate::games::types::{
    Address, Amount, BetId, BetRecord, RandomWord, RawSelector, RequestId,
};
use crate::games::vrf_engine::RandomnessOracle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// 0.001 ether in wei
pub const DEFAULT_BET_AMOUNT: Amount = 1_000_000_000_000_000;

/// Selections allowed in one bet unless configured otherwise
pub const DEFAULT_MAX_SELECTORS: usize = 6;

/// Wager parameters fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WagerSettings {
    /// Stake per selection
    pub bet_amount: Amount,
    /// `None` accepts any number of selections
    pub max_selectors: Option<usize>,
    /// Charged against the oracle-fee balance for every request
    pub request_fee: Amount,
}

impl Default for WagerSettings {
    fn default() -> Self {
        Self {
            bet_amount: DEFAULT_BET_AMOUNT,
            max_selectors: Some(DEFAULT_MAX_SELECTORS),
            request_fee: 0,
        }
    }
}

/// What a successful randomness callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub request_id: RequestId,
    pub bet_id: BetId,
    pub outcome: u8,
    pub reward_amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagerController {
    settings: WagerSettings,
    owner: Address,
    oracle: Address,
    #[serde(skip)]
    payout_table: PayoutTable,
    ledger: BetLedger,
    tracker: RandomnessRequestTracker,
    /// Pooled native balance: stakes in, rewards out
    balance: Amount,
    oracle_fee_balance: Amount,
    events: Vec<WagerEvent>,
}

impl WagerController {
    pub fn new(settings: WagerSettings, owner: Address, oracle: Address) -> Self {
        info!(
            owner = %owner,
            oracle = %oracle,
            bet_amount = %settings.bet_amount,
            "Wager controller created"
        );
        Self {
            settings,
            owner,
            oracle,
            payout_table: PayoutTable::STANDARD,
            ledger: BetLedger::new(),
            tracker: RandomnessRequestTracker::new(),
            balance: 0,
            oracle_fee_balance: 0,
            events: Vec::new(),
        }
    }

    /// Accept a bet of `bet_amount` per selection and queue its randomness request
    pub fn place_bet(
        &mut self,
        player: Address,
        selectors: &[RawSelector],
        attached_value: Amount,
    ) -> Result<BetId, WagerError> {
        if selectors.is_empty() {
            return Err(WagerError::EmptySelection);
        }
        if let Some(max) = self.settings.max_selectors {
            if selectors.len() > max {
                return Err(WagerError::TooManySelections {
                    count: selectors.len(),
                    max,
                });
            }
        }

        let selectors = self.payout_table.resolve(selectors).map_err(|e| {
            debug!(player = %player, error = %e, "Bet selection rejected");
            e
        })?;

        let expected = self
            .settings
            .bet_amount
            .checked_mul(selectors.len() as Amount);
        if expected != Some(attached_value) {
            return Err(WagerError::StakeMismatch {
                expected: expected.unwrap_or(Amount::MAX),
                attached: attached_value,
            });
        }

        let fee = self.settings.request_fee;
        let remaining_fees = self.oracle_fee_balance.checked_sub(fee).ok_or_else(|| {
            warn!(required = %fee, available = %self.oracle_fee_balance, "Oracle fee balance exhausted");
            WagerError::InsufficientOracleFunds {
                required: fee,
                available: self.oracle_fee_balance,
            }
        })?;
        let balance = self
            .balance
            .checked_add(attached_value)
            .ok_or(WagerError::BalanceOverflow)?;

        let bet_id = self.ledger.next_bet_id();
        let request_id = self.tracker.issue(bet_id);
        self.ledger.insert(BetRecord {
            bet_id,
            player,
            bet_amount: self.settings.bet_amount,
            selectors: selectors.clone(),
            request_id,
            placed_at: unix_now(),
            outcome: None,
            reward_amount: 0,
            is_settled: false,
            is_claimed: false,
        });
        self.balance = balance;
        self.oracle_fee_balance = remaining_fees;

        self.events.push(WagerEvent::BetPlaced {
            bet_id,
            request_id,
            player,
            selectors,
            bet_amount: self.settings.bet_amount,
        });

        info!(
            bet_id,
            request_id = %request_id,
            player = %player,
            stake = %attached_value,
            "Bet placed"
        );

        Ok(bet_id)
    }

    /// Oracle callback: settle the bet behind `request_id` from `words[0]`
    pub fn receive_randomness(
        &mut self,
        caller: Address,
        request_id: RequestId,
        words: &[RandomWord],
    ) -> Result<SettlementReport, WagerError> {
        if caller != self.oracle {
            warn!(caller = %caller, request_id = %request_id, "Randomness from unauthorised caller");
            return Err(WagerError::UnauthorizedOracle(caller));
        }

        let record = self
            .tracker
            .pending_bet(&request_id)
            .and_then(|bet_id| self.ledger.get(bet_id))
            .filter(|record| !record.is_settled)
            .ok_or_else(|| {
                warn!(request_id = %request_id, "Callback for unknown or resolved request");
                WagerError::UnknownOrResolvedRequest(request_id)
            })?;

        let word = words
            .first()
            .ok_or(WagerError::EmptyRandomWords(request_id))?;

        let bet_id = record.bet_id;
        let outcome = settlement::outcome_from_word(word);
        let reward_amount = settlement::evaluate(
            &self.payout_table,
            outcome,
            record.bet_amount,
            &record.selectors,
        )
        .ok_or(WagerError::BalanceOverflow)?;

        self.tracker.resolve(&request_id);
        self.ledger.record_outcome(bet_id, outcome, reward_amount);
        self.events.push(WagerEvent::RandomnessFulfilled {
            request_id,
            bet_id,
            outcome,
        });

        info!(
            bet_id,
            request_id = %request_id,
            outcome,
            reward = %reward_amount,
            "Bet settled"
        );

        Ok(SettlementReport {
            request_id,
            bet_id,
            outcome,
            reward_amount,
        })
    }

    /// Pay out every listed bet or none of them; returns the total paid
    pub fn claim(&mut self, caller: Address, bet_ids: &[BetId]) -> Result<Amount, WagerError> {
        if bet_ids.is_empty() {
            return Err(WagerError::EmptyClaim);
        }

        let mut remaining = self.balance;
        let mut seen = BTreeSet::new();
        let mut payouts = Vec::with_capacity(bet_ids.len());

        for &bet_id in bet_ids {
            let record = self.ledger.get(bet_id).ok_or(WagerError::UnknownBet(bet_id))?;
            if record.player != caller {
                return Err(WagerError::NotOwner { bet_id, caller });
            }
            if !record.is_settled {
                return Err(WagerError::NotSettled(bet_id));
            }
            if record.reward_amount == 0 {
                return Err(WagerError::NothingToClaim(bet_id));
            }
            if record.is_claimed || !seen.insert(bet_id) {
                return Err(WagerError::AlreadyClaimed(bet_id));
            }

            let reward = record.reward_amount;
            remaining = remaining.checked_sub(reward).ok_or_else(|| {
                warn!(bet_id, required = %reward, available = %remaining, "Insufficient funds for claim");
                WagerError::InsufficientFunds {
                    bet_id,
                    required: reward,
                    available: remaining,
                }
            })?;
            payouts.push((bet_id, reward));
        }

        let total = self.balance - remaining;
        self.balance = remaining;
        for (bet_id, amount) in payouts {
            self.ledger.mark_claimed(bet_id);
            self.events.push(WagerEvent::RewardClaimed {
                player: caller,
                bet_id,
                amount,
            });
        }

        info!(player = %caller, bets = bet_ids.len(), total = %total, "Rewards claimed");
        Ok(total)
    }

    /// Top up the pooled balance; open to anyone
    pub fn fund(&mut self, from: Address, amount: Amount) -> Result<Amount, WagerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(WagerError::BalanceOverflow)?;
        self.events.push(WagerEvent::Funded { from, amount });
        info!(from = %from, amount = %amount, balance = %self.balance, "Pool funded");
        Ok(self.balance)
    }

    pub fn deposit_oracle_fees(&mut self, caller: Address, amount: Amount) -> Result<Amount, WagerError> {
        self.ensure_owner(caller)?;
        self.oracle_fee_balance = self
            .oracle_fee_balance
            .checked_add(amount)
            .ok_or(WagerError::BalanceOverflow)?;
        self.events.push(WagerEvent::OracleFeesDeposited { amount });
        info!(amount = %amount, "Oracle fees deposited");
        Ok(self.oracle_fee_balance)
    }

    /// Sweep the whole oracle-fee balance to the owner
    pub fn withdraw_oracle_fees(&mut self, caller: Address) -> Result<Amount, WagerError> {
        self.ensure_owner(caller)?;
        let amount = std::mem::take(&mut self.oracle_fee_balance);
        self.events.push(WagerEvent::OracleFeesWithdrawn { to: caller, amount });
        info!(to = %caller, amount = %amount, "Oracle fees withdrawn");
        Ok(amount)
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), WagerError> {
        if caller != self.owner {
            warn!(caller = %caller, "Owner-only call rejected");
            return Err(WagerError::NotContractOwner(caller));
        }
        Ok(())
    }

    /// Ask `oracle` for every open request and feed the answers back in bet order
    pub fn fulfil_pending<O: RandomnessOracle + ?Sized>(
        &mut self,
        oracle: &O,
    ) -> RouletteResult<Vec<SettlementReport>> {
        let caller = oracle.address();
        let mut reports = Vec::new();
        for request in self.tracker.pending_requests() {
            let words = oracle.fulfil(&request)?;
            reports.push(self.receive_randomness(caller, request.request_id, &words)?);
        }
        Ok(reports)
    }

    pub fn bet_info(&self, bet_id: BetId) -> Option<&BetRecord> {
        self.ledger.get(bet_id)
    }

    pub fn player_bet_ids(&self, player: &Address) -> &[BetId] {
        self.ledger.player_bet_ids(player)
    }

    pub fn player_bet_at(&self, player: &Address, index: usize) -> Option<BetId> {
        self.ledger.player_bet_at(player, index)
    }

    pub fn last_bet_id(&self) -> BetId {
        self.ledger.last_bet_id()
    }

    pub fn bet_amount(&self) -> Amount {
        self.settings.bet_amount
    }

    pub fn settings(&self) -> &WagerSettings {
        &self.settings
    }

    pub fn payout_table(&self) -> &PayoutTable {
        &self.payout_table
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn oracle_fee_balance(&self) -> Amount {
        self.oracle_fee_balance
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn oracle(&self) -> Address {
        self.oracle
    }

    pub fn request(&self, request_id: &RequestId) -> Option<&RequestEntry> {
        self.tracker.get(request_id)
    }

    pub fn pending_requests(&self) -> Vec<RandomnessRequest> {
        self.tracker.pending_requests()
    }

    pub fn events(&self) -> &[WagerEvent] {
        &self.events
    }

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    /// Cross-check ledger, tracker and balances after loading from storage
    pub fn verify_integrity(&self) -> Result<(), StorageError> {
        self.ledger.verify_integrity()?;

        for record in self.ledger.iter() {
            let entry = self.tracker.get(&record.request_id).ok_or_else(|| {
                StorageError::CorruptedData(format!("bet {} has no request entry", record.bet_id))
            })?;
            if entry.bet_id != record.bet_id {
                return Err(StorageError::CorruptedData(format!(
                    "request {} maps to bet {}, expected {}",
                    record.request_id, entry.bet_id, record.bet_id
                )));
            }
            if entry.resolved != record.is_settled {
                return Err(StorageError::CorruptedData(format!(
                    "bet {} settlement does not match its request state",
                    record.bet_id
                )));
            }
            if record.bet_amount == 0 {
                return Err(StorageError::CorruptedData(format!(
                    "bet {} has a zero stake",
                    record.bet_id
                )));
            }
        }

        if self.tracker.len() != self.ledger.len() {
            return Err(StorageError::CorruptedData(format!(
                "{} requests tracked for {} bets",
                self.tracker.len(),
                self.ledger.len()
            )));
        }
        Ok(())
    }
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
