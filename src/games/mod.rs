pub mod types;
pub mod payout;
pub mod settlement;
pub mod ledger;
pub mod request_tracker;
pub mod events;
pub mod vrf_engine;
pub mod controller;

pub use types::*;
pub use controller::{SettlementReport, WagerController, WagerSettings};
pub use events::WagerEvent;
pub use ledger::BetLedger;
pub use payout::PayoutTable;
pub use request_tracker::{RandomnessRequest, RandomnessRequestTracker};
pub use vrf_engine::{RandomnessOracle, VrfOracle};
