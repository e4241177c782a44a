//! Payout table: multiplier and selector domain for each bet category.

use crate::errors::WagerError;
use crate::games::types::{BetCategory, RawSelector, Selector};
use serde::{Deserialize, Serialize};

/// Pay-out rule for a single category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRule {
    /// Total returned per unit of stake on a win, stake included
    pub multiplier: u64,
    /// Number of valid choices, `0..domain_size`
    pub domain_size: u8,
}

/// Read-only category table, indexed by category id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutTable {
    rules: [CategoryRule; 6],
}

impl PayoutTable {
    /// Standard single-zero table
    pub const STANDARD: PayoutTable = PayoutTable {
        rules: [
            CategoryRule { multiplier: 2, domain_size: 2 },   // color
            CategoryRule { multiplier: 3, domain_size: 3 },   // column
            CategoryRule { multiplier: 3, domain_size: 3 },   // dozen
            CategoryRule { multiplier: 2, domain_size: 2 },   // half
            CategoryRule { multiplier: 2, domain_size: 2 },   // parity
            CategoryRule { multiplier: 36, domain_size: 37 }, // straight
        ],
    };

    pub fn rule(&self, category: BetCategory) -> CategoryRule {
        self.rules[category.id() as usize]
    }

    pub fn multiplier(&self, category: BetCategory) -> u64 {
        self.rule(category).multiplier
    }

    pub fn domain_size(&self, category: BetCategory) -> u8 {
        self.rule(category).domain_size
    }

    /// Largest valid choice for the category
    pub fn number_range(&self, category: BetCategory) -> u8 {
        self.domain_size(category) - 1
    }

    /// Validate raw selectors against the table.
    ///
    /// Categories are checked for every selector before any choice is, so a
    /// bad category anywhere wins over a bad choice earlier in the list.
    pub fn resolve(&self, raw: &[RawSelector]) -> Result<Vec<Selector>, WagerError> {
        let mut categories = Vec::with_capacity(raw.len());
        for (index, selector) in raw.iter().enumerate() {
            let category = selector
                .category
                .and_then(BetCategory::from_id)
                .ok_or(WagerError::InvalidCategory {
                    index,
                    category: selector.category,
                })?;
            categories.push(category);
        }

        raw.iter()
            .zip(categories)
            .enumerate()
            .map(|(index, (selector, category))| match selector.choice {
                Some(choice) if choice < self.domain_size(category) => {
                    Ok(Selector::new(category, choice))
                }
                choice => Err(WagerError::InvalidChoice {
                    index,
                    category: category.id(),
                    choice,
                    max: self.number_range(category),
                }),
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BetCategory, CategoryRule)> + '_ {
        BetCategory::ALL
            .into_iter()
            .map(move |category| (category, self.rule(category)))
    }
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self::STANDARD
    }
}
