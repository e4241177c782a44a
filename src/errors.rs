//! Error types for the roulette ledger
//!
//! Every lifecycle rejection is a `WagerError` with a stable kind; the
//! ambient concerns (configuration, storage, oracle) get their own enums and
//! are collected under `RouletteError`.

use crate::games::types::{Address, Amount, BetId, RequestId};

/// Root error type for all ledger operations
#[derive(Debug, thiserror::Error)]
pub enum RouletteError {
    #[error("Wager rejected: {0}")]
    Wager(#[from] WagerError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Rejections raised by the wager lifecycle.
///
/// A rejected call never changes ledger state, so every kind except
/// `InsufficientFunds` is final for the given input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WagerError {
    #[error("Bet must contain at least one selection")]
    EmptySelection,

    #[error("Bet has {count} selections, at most {max} allowed")]
    TooManySelections { count: usize, max: usize },

    #[error("Selection {index} has an invalid category: {category:?}")]
    InvalidCategory { index: usize, category: Option<u8> },

    #[error("Selection {index} has an invalid choice {choice:?} for category {category} (max {max})")]
    InvalidChoice {
        index: usize,
        category: u8,
        choice: Option<u8>,
        max: u8,
    },

    #[error("Stake mismatch: expected {expected}, attached {attached}")]
    StakeMismatch { expected: Amount, attached: Amount },

    #[error("Oracle fee balance {available} cannot cover request fee {required}")]
    InsufficientOracleFunds { required: Amount, available: Amount },

    #[error("Caller {0} is not the configured randomness oracle")]
    UnauthorizedOracle(Address),

    #[error("Randomness request {0} is unknown or already resolved")]
    UnknownOrResolvedRequest(RequestId),

    #[error("Randomness callback for {0} carried no words")]
    EmptyRandomWords(RequestId),

    #[error("Claim must name at least one bet")]
    EmptyClaim,

    #[error("Bet {0} does not exist")]
    UnknownBet(BetId),

    #[error("Bet {bet_id} is not owned by {caller}")]
    NotOwner { bet_id: BetId, caller: Address },

    #[error("Bet {0} has not been settled")]
    NotSettled(BetId),

    #[error("Bet {0} has no reward to claim")]
    NothingToClaim(BetId),

    #[error("Bet {0} has already been claimed")]
    AlreadyClaimed(BetId),

    #[error("Insufficient funds to pay bet {bet_id}: need {required}, have {available}")]
    InsufficientFunds {
        bet_id: BetId,
        required: Amount,
        available: Amount,
    },

    #[error("Caller {0} is not the contract owner")]
    NotContractOwner(Address),

    #[error("Balance arithmetic overflow")]
    BalanceOverflow,
}

impl WagerError {
    /// Stable machine-readable identifier for the rejection kind
    pub fn code(&self) -> &'static str {
        match self {
            WagerError::EmptySelection => "EMPTY_SELECTION",
            WagerError::TooManySelections { .. } => "TOO_MANY_SELECTIONS",
            WagerError::InvalidCategory { .. } => "INVALID_CATEGORY",
            WagerError::InvalidChoice { .. } => "INVALID_CHOICE",
            WagerError::StakeMismatch { .. } => "STAKE_MISMATCH",
            WagerError::InsufficientOracleFunds { .. } => "INSUFFICIENT_ORACLE_FUNDS",
            WagerError::UnauthorizedOracle(_) => "UNAUTHORIZED_ORACLE",
            WagerError::UnknownOrResolvedRequest(_) => "UNKNOWN_OR_RESOLVED_REQUEST",
            WagerError::EmptyRandomWords(_) => "EMPTY_RANDOM_WORDS",
            WagerError::EmptyClaim => "EMPTY_CLAIM",
            WagerError::UnknownBet(_) => "UNKNOWN_BET",
            WagerError::NotOwner { .. } => "NOT_OWNER",
            WagerError::NotSettled(_) => "NOT_SETTLED",
            WagerError::NothingToClaim(_) => "NOTHING_TO_CLAIM",
            WagerError::AlreadyClaimed(_) => "ALREADY_CLAIMED",
            WagerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            WagerError::NotContractOwner(_) => "NOT_CONTRACT_OWNER",
            WagerError::BalanceOverflow => "BALANCE_OVERFLOW",
        }
    }

    /// Whether the same call may succeed later without changing its input
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WagerError::InsufficientFunds { .. } | WagerError::InsufficientOracleFunds { .. }
        )
    }
}

/// Randomness oracle failures
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("Invalid oracle seed: {0}")]
    InvalidSeed(String),

    #[error("Invalid proof encoding: {0}")]
    InvalidProof(String),

    #[error("Oracle fulfilment failed: {0}")]
    FulfilmentFailed(String),
}

/// Configuration and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Snapshot persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

impl From<std::io::Error> for RouletteError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                RouletteError::Storage(StorageError::ReadFailed(e.to_string()))
            }
            _ => RouletteError::Storage(StorageError::WriteFailed(e.to_string())),
        }
    }
}

/// Convenience type alias for Results
pub type RouletteResult<T> = Result<T, RouletteError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err: RouletteError = WagerError::StakeMismatch {
            expected: 2_000,
            attached: 1_000,
        }
        .into();

        assert!(err.to_string().contains("Wager rejected"));
        assert!(err.to_string().contains("expected 2000"));
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            WagerError::EmptySelection,
            WagerError::EmptyClaim,
            WagerError::UnknownBet(1),
            WagerError::NotSettled(1),
            WagerError::NothingToClaim(1),
            WagerError::AlreadyClaimed(1),
            WagerError::BalanceOverflow,
        ];
        let mut codes: Vec<_> = errors.iter().map(WagerError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_retryable_kinds() {
        let funds = WagerError::InsufficientFunds {
            bet_id: 1,
            required: 10,
            available: 5,
        };
        assert!(funds.is_retryable());
        assert!(!WagerError::AlreadyClaimed(1).is_retryable());
    }

    #[test]
    fn test_error_source() {
        let err: RouletteError = ConfigurationError::ValidationFailed("test".to_string()).into();
        assert!(err.source().is_some());
    }
}
