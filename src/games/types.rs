use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Native value in the ledger's smallest unit (wei for the reference deployment)
pub type Amount = u128;

/// Dense bet identifier, starting at 1
pub type BetId = u64;

/// Decode an optionally `0x`-prefixed hex string into a fixed-size array
fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], hex::FromHexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out)?;
    Ok(out)
}

/// 20-byte account address, rendered as `0x`-prefixed hex
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a stable address from a human label (`alice`, `house`, ...)
    pub fn from_label(label: &str) -> Self {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed(s).map(Self)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = hex::FromHexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Opaque handle correlating an outbound randomness request with its callback
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RequestId([u8; 32]);

impl RequestId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self)
    }
}

impl FromStr for RequestId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed(s).map(Self)
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RequestId {
    type Error = hex::FromHexError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// 256-bit random word delivered by the oracle, big-endian
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RandomWord([u8; 32]);

impl RandomWord {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for RandomWord {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<u128> for RandomWord {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl From<u64> for RandomWord {
    fn from(value: u64) -> Self {
        Self::from(value as u128)
    }
}

impl fmt::Display for RandomWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RandomWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RandomWord({})", self)
    }
}

/// Accepts `0x`-prefixed hex of up to 64 digits, or a decimal `u128`
impl FromStr for RandomWord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_prefix("0x") {
            if digits.len() > 64 {
                return Err(format!("random word '{}' is wider than 256 bits", s));
            }
            let padded = format!("{:0>64}", digits);
            return decode_fixed(&padded)
                .map(Self)
                .map_err(|e| format!("invalid random word '{}': {}", s, e));
        }

        s.parse::<u128>()
            .map(Self::from)
            .map_err(|e| format!("invalid random word '{}': {}", s, e))
    }
}

impl From<RandomWord> for String {
    fn from(word: RandomWord) -> Self {
        word.to_string()
    }
}

impl TryFrom<String> for RandomWord {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The six wager categories, identified on the wire by 0..=5
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BetCategory {
    Color,
    Column,
    Dozen,
    Half,
    Parity,
    Straight,
}

impl BetCategory {
    pub const ALL: [BetCategory; 6] = [
        BetCategory::Color,
        BetCategory::Column,
        BetCategory::Dozen,
        BetCategory::Half,
        BetCategory::Parity,
        BetCategory::Straight,
    ];

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            BetCategory::Color => "color",
            BetCategory::Column => "column",
            BetCategory::Dozen => "dozen",
            BetCategory::Half => "half",
            BetCategory::Parity => "parity",
            BetCategory::Straight => "straight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.name().eq_ignore_ascii_case(name))
    }

    /// Symbolic aliases for two-way categories
    fn choice_from_name(self, name: &str) -> Option<u8> {
        let name = name.to_ascii_lowercase();
        match (self, name.as_str()) {
            (BetCategory::Color, "red") => Some(0),
            (BetCategory::Color, "black") => Some(1),
            (BetCategory::Half, "low") => Some(0),
            (BetCategory::Half, "high") => Some(1),
            (BetCategory::Parity, "even") => Some(0),
            (BetCategory::Parity, "odd") => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for BetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid selector '{0}', expected <category>:<choice>")]
pub struct SelectorParseError(pub String);

/// Unvalidated selector as submitted by a caller.
///
/// Either half may be missing; the controller rejects such input with a
/// category or choice error rather than at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSelector {
    pub category: Option<u8>,
    pub choice: Option<u8>,
}

impl RawSelector {
    pub fn new(category: u8, choice: u8) -> Self {
        Self {
            category: Some(category),
            choice: Some(choice),
        }
    }
}

impl From<Selector> for RawSelector {
    fn from(selector: Selector) -> Self {
        Self::new(selector.category.id(), selector.choice)
    }
}

/// Parses `color:red`, `5:17`, `dozen:2`; a bare `straight` leaves the choice empty
impl FromStr for RawSelector {
    type Err = SelectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SelectorParseError(s.to_string());
        let (category_part, choice_part) = match s.split_once(':') {
            Some((c, n)) => (c.trim(), Some(n.trim())),
            None => (s.trim(), None),
        };

        let (category_id, named) = match category_part.parse::<u8>() {
            Ok(id) => (id, BetCategory::from_id(id)),
            Err(_) => {
                let category = BetCategory::from_name(category_part).ok_or_else(err)?;
                (category.id(), Some(category))
            }
        };

        let choice = match choice_part {
            None | Some("") => None,
            Some(text) => match text.parse::<u8>() {
                Ok(n) => Some(n),
                Err(_) => Some(
                    named
                        .and_then(|category| category.choice_from_name(text))
                        .ok_or_else(err)?,
                ),
            },
        };

        Ok(Self {
            category: Some(category_id),
            choice,
        })
    }
}

/// Validated (category, choice) pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Selector {
    pub category: BetCategory,
    pub choice: u8,
}

impl Selector {
    pub fn new(category: BetCategory, choice: u8) -> Self {
        Self { category, choice }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.choice)
    }
}

/// One wager as recorded on the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetRecord {
    pub bet_id: BetId,
    pub player: Address,
    /// Stake per selection
    pub bet_amount: Amount,
    pub selectors: Vec<Selector>,
    pub request_id: RequestId,
    /// Unix seconds
    pub placed_at: u64,
    pub outcome: Option<u8>,
    pub reward_amount: Amount,
    pub is_settled: bool,
    pub is_claimed: bool,
}

impl BetRecord {
    /// Total value collected when the bet was placed
    pub fn stake(&self) -> Amount {
        self.bet_amount.saturating_mul(self.selectors.len() as Amount)
    }

    pub fn is_claimable(&self) -> bool {
        self.is_settled && !self.is_claimed && self.reward_amount > 0
    }
}
