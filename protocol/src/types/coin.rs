//! # Coins & Denominations
//!
//! A [`Coin`] is a whole-unit amount of a single denomination. Asset amounts
//! are never fractional -- fractions only exist on the share side of the
//! ledger (see [`Dec`](super::Dec)).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{MAX_DENOM_LENGTH, MIN_DENOM_LENGTH};

/// Errors returned by denom validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenomError {
    /// Length is outside `[MIN_DENOM_LENGTH, MAX_DENOM_LENGTH]`.
    #[error("invalid denom {denom:?}: length {len} outside [{MIN_DENOM_LENGTH}, {MAX_DENOM_LENGTH}]")]
    Length {
        /// The rejected denom.
        denom: String,
        /// Its length in bytes.
        len: usize,
    },

    /// First character is not an ASCII letter.
    #[error("invalid denom {0:?}: must start with a letter")]
    LeadingChar(String),

    /// Contains a character outside `[A-Za-z0-9/:._-]`.
    #[error("invalid denom {denom:?}: illegal character {ch:?}")]
    IllegalChar {
        /// The rejected denom.
        denom: String,
        /// The first offending character.
        ch: char,
    },
}

/// Validates a denomination string.
///
/// Accepted: 3-128 characters, an ASCII letter first, then ASCII
/// alphanumerics or one of `/ : . _ -`.
pub fn validate_denom(denom: &str) -> Result<(), DenomError> {
    let len = denom.len();
    if !(MIN_DENOM_LENGTH..=MAX_DENOM_LENGTH).contains(&len) {
        return Err(DenomError::Length {
            denom: denom.to_string(),
            len,
        });
    }

    let mut chars = denom.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(DenomError::LeadingChar(denom.to_string())),
    }

    if let Some(ch) = chars.find(|c| !(c.is_ascii_alphanumeric() || "/:._-".contains(*c))) {
        return Err(DenomError::IllegalChar {
            denom: denom.to_string(),
            ch,
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// A whole-unit amount of one denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Asset denomination, e.g. `usdx` or `bnova-validator1`.
    pub denom: String,
    /// Amount in the smallest unit of `denom`.
    #[serde(with = "amount_string")]
    pub amount: u128,
}

impl Coin {
    /// Creates a coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// A zero amount of `denom`.
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, 0)
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Validates the denom. Zero amounts are valid coins.
    pub fn validate(&self) -> Result<(), DenomError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// ---------------------------------------------------------------------------
// Serde helper: u128 amounts as decimal strings
// ---------------------------------------------------------------------------

/// Serde helper module that writes `u128` amounts as decimal strings.
///
/// JSON consumers routinely parse numbers as IEEE doubles, which silently
/// corrupts anything above 2^53. Strings round-trip exactly.
pub mod amount_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
