//! Settlement engine
//!
//! Pure functions that turn a random word into a wheel outcome and an
//! outcome plus a bet's selectors into a reward. Nothing here touches the
//! ledger.

use crate::games::payout::PayoutTable;
use crate::games::types::{Amount, BetCategory, RandomWord, Selector};

/// Faces on the wheel, 0..=36
pub const WHEEL_SIZE: u8 = 37;

pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Reduce a 256-bit big-endian word modulo the wheel size
pub fn outcome_from_word(word: &RandomWord) -> u8 {
    let modulus = WHEEL_SIZE as u32;
    word.as_bytes()
        .iter()
        .fold(0u32, |acc, byte| (acc * 256 + *byte as u32) % modulus) as u8
}

pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

/// Whether a single selector wins for the given outcome.
///
/// Zero loses every outside bet; only a straight bet on 0 collects.
pub fn selector_wins(selector: &Selector, outcome: u8) -> bool {
    match selector.category {
        BetCategory::Straight => selector.choice == outcome,
        _ if outcome == 0 || outcome >= WHEEL_SIZE => false,
        BetCategory::Color => {
            let red = selector.choice == 0;
            is_red(outcome) == red
        }
        BetCategory::Column => (outcome - 1) % 3 == selector.choice,
        BetCategory::Dozen => (outcome - 1) / 12 == selector.choice,
        BetCategory::Half => {
            let low = selector.choice == 0;
            (outcome <= 18) == low
        }
        BetCategory::Parity => outcome % 2 == selector.choice,
    }
}

/// Total reward for a bet: `bet_amount * multiplier` for every winning selector.
///
/// `None` if the total does not fit in an `Amount`.
pub fn evaluate(
    table: &PayoutTable,
    outcome: u8,
    bet_amount: Amount,
    selectors: &[Selector],
) -> Option<Amount> {
    selectors
        .iter()
        .filter(|selector| selector_wins(selector, outcome))
        .try_fold(0 as Amount, |total, selector| {
            bet_amount
                .checked_mul(table.multiplier(selector.category) as Amount)
                .and_then(|reward| total.checked_add(reward))
        })
}
