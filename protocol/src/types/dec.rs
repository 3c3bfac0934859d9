//! # Fixed-Point Decimal
//!
//! Share amounts are fractional, asset amounts are not. [`Dec`] is an unsigned
//! fixed-point number with [`DECIMAL_PRECISION`] fractional digits, stored as a
//! `u128` count of atoms (`1.0 == 10^18` atoms).
//!
//! There is deliberately no `Mul`/`Div` operator on `Dec`. Share conversion
//! has to multiply every numerator term before dividing once, and it has to
//! round toward the vault. [`mul_div_floor`] and [`mul_div_ceil`] do exactly
//! that with a 256-bit intermediate, so callers never see an intermediate
//! overflow or an early truncation.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uint::construct_uint;

use crate::config::{DECIMAL_ONE, DECIMAL_PRECISION};

construct_uint! {
    /// 256-bit unsigned integer used for mul-before-div intermediates.
    pub struct U256(4);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by decimal parsing and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecError {
    /// The string is not a decimal number.
    #[error("invalid decimal: {0:?}")]
    Invalid(String),

    /// The string is a negative number; `Dec` is unsigned.
    #[error("decimal {0} is negative")]
    Negative(String),

    /// More fractional digits than the supported precision.
    #[error("decimal {0} exceeds {DECIMAL_PRECISION} fractional digits")]
    TooPrecise(String),

    /// The result does not fit in the 128-bit atom representation.
    #[error("decimal overflow")]
    Overflow,

    /// A subtraction would go below zero.
    #[error("decimal underflow: {minuend} - {subtrahend}")]
    Underflow {
        /// Left-hand side of the subtraction.
        minuend: Dec,
        /// Right-hand side of the subtraction.
        subtrahend: Dec,
    },
}

// ---------------------------------------------------------------------------
// mul_div_floor
// ---------------------------------------------------------------------------

/// Computes `floor(a * b / c)` with a 256-bit intermediate product.
///
/// Returns `None` when `c` is zero or the quotient does not fit in `u128`.
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }

    let quotient = U256::from(a)
        .checked_mul(U256::from(b))?
        .checked_div(U256::from(c))?;

    if quotient > U256::from(u128::MAX) {
        return None;
    }

    Some(quotient.as_u128())
}

/// Computes `ceil(a * b / c)` with a 256-bit intermediate product.
///
/// Returns `None` when `c` is zero or the quotient does not fit in `u128`.
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }

    let product = U256::from(a).checked_mul(U256::from(b))?;
    let divisor = U256::from(c);
    let mut quotient = product / divisor;
    if !(product % divisor).is_zero() {
        quotient = quotient.checked_add(U256::one())?;
    }

    if quotient > U256::from(u128::MAX) {
        return None;
    }

    Some(quotient.as_u128())
}

// ---------------------------------------------------------------------------
// Dec
// ---------------------------------------------------------------------------

/// Unsigned fixed-point decimal with 18 fractional digits.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(u128);

impl Dec {
    /// The decimal `0`.
    pub const ZERO: Dec = Dec(0);

    /// The decimal `1`.
    pub const ONE: Dec = Dec(DECIMAL_ONE);

    /// Builds a decimal directly from its atom count.
    pub const fn from_atoms(atoms: u128) -> Self {
        Self(atoms)
    }

    /// Returns the raw atom count (`value * 10^18`).
    pub const fn atoms(&self) -> u128 {
        self.0
    }

    /// Converts a whole number into a decimal.
    pub fn from_int(value: u128) -> Result<Self, DecError> {
        value
            .checked_mul(DECIMAL_ONE)
            .map(Self)
            .ok_or(DecError::Overflow)
    }

    /// Returns `true` for `0`.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `true` for anything strictly greater than `0`.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Dec) -> Result<Dec, DecError> {
        self.0
            .checked_add(other.0)
            .map(Dec)
            .ok_or(DecError::Overflow)
    }

    /// Checked subtraction. Fails instead of going negative.
    pub fn checked_sub(self, other: Dec) -> Result<Dec, DecError> {
        self.0.checked_sub(other.0).map(Dec).ok_or(DecError::Underflow {
            minuend: self,
            subtrahend: other,
        })
    }

    /// Drops the fractional part.
    pub fn truncate_int(&self) -> u128 {
        self.0 / DECIMAL_ONE
    }

    /// Returns the fractional part as atoms.
    pub fn fractional_atoms(&self) -> u128 {
        self.0 % DECIMAL_ONE
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.truncate_int(),
            self.fractional_atoms(),
            width = DECIMAL_PRECISION as usize
        )
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({self})")
    }
}

impl FromStr for Dec {
    type Err = DecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(DecError::Negative(s.to_string()));
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(DecError::Invalid(s.to_string()));
        }
        if frac_part.len() > DECIMAL_PRECISION as usize {
            return Err(DecError::TooPrecise(s.to_string()));
        }

        let whole: u128 = int_part.parse().map_err(|_| DecError::Overflow)?;
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            let scale = 10u128.pow(DECIMAL_PRECISION - frac_part.len() as u32);
            let digits: u128 = frac_part
                .parse()
                .map_err(|_| DecError::Invalid(s.to_string()))?;
            digits * scale
        };

        Dec::from_int(whole)?.checked_add(Dec(frac))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
