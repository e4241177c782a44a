//! Roulette Ledger - single-zero roulette wagering engine
//!
//! Bets are validated and recorded by the [`WagerController`], settled when
//! an external randomness oracle answers the bet's request, and paid out on
//! claim from a pooled balance.

pub mod config;
pub mod errors;
pub mod game_store;
pub mod games;

pub use config::{ConfigLoader, RouletteConfig};
pub use errors::{RouletteError, RouletteResult, WagerError};
pub use games::{
    Address, Amount, BetCategory, BetId, BetRecord, RandomWord, RawSelector, RequestId, Selector,
    WagerController, WagerEvent, WagerSettings,
};
