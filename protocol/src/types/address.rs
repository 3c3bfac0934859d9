//! # Account Addresses
//!
//! The earn module treats account addresses as opaque byte strings: it never
//! derives them, signs with them, or checks ownership. It only needs them as
//! stable map keys and as something readable in logs and genesis files.
//!
//! Human-facing form is bech32 with the [`ACCOUNT_HRP`] prefix, e.g.
//! `nova1qyqszqgpqyqszqgpqyqszqgpqyqszqgp...`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ACCOUNT_HRP, MAX_ADDRESS_LENGTH};

/// Errors that can occur while building or parsing an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Zero-length address.
    #[error("address is empty")]
    Empty,

    /// Longer than [`MAX_ADDRESS_LENGTH`] bytes.
    #[error("address length {0} exceeds {MAX_ADDRESS_LENGTH} bytes")]
    TooLong(usize),

    /// The string could not be decoded as bech32.
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// Decoded fine, but with the wrong human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp {
        /// The expected HRP.
        expected: String,
        /// The HRP that was actually found.
        got: String,
    },
}

/// An opaque account address, 1 to 255 raw bytes.
///
/// Ordering is by length first, then bytes. That is the order the share
/// record keys sort in, so iterating the store and sorting addresses agree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address(Vec<u8>);

impl Address {
    /// Wraps raw address bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, AddressError> {
        let bytes = bytes.into();
        match bytes.len() {
            0 => Err(AddressError::Empty),
            n if n > MAX_ADDRESS_LENGTH => Err(AddressError::TooLong(n)),
            _ => Ok(Self(bytes)),
        }
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Bech32 string form.
    pub fn to_bech32(&self) -> String {
        match Hrp::parse(ACCOUNT_HRP) {
            Ok(hrp) => bech32::encode::<Bech32>(hrp, &self.0).unwrap_or_else(|_| self.to_hex()),
            Err(_) => self.to_hex(),
        }
    }

    /// Parses a bech32 address with the [`ACCOUNT_HRP`] prefix.
    pub fn from_bech32(s: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(s).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

        if hrp.as_str() != ACCOUNT_HRP {
            return Err(AddressError::InvalidHrp {
                expected: ACCOUNT_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        Self::from_bytes(data)
    }

    /// Lower-case hex of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_bech32())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_bech32())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
