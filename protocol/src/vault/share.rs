//! # Vault Shares
//!
//! A [`VaultShare`] is a share amount for one vault denom. [`VaultShares`] is
//! the per-depositor set of them, kept sorted by denom with no duplicates and
//! no zero entries so that equality and serialization are deterministic.
//!
//! The set is a `Vec` rather than a map on purpose: records loaded from
//! genesis or storage can be malformed, and [`VaultShares::validate`] has to
//! be able to see (and reject) unsorted or duplicated entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ShareError;
use crate::types::{validate_denom, Dec};

// ---------------------------------------------------------------------------
// VaultShare
// ---------------------------------------------------------------------------

/// A share amount for a single vault denom.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultShare {
    /// Vault denom the shares belong to.
    pub denom: String,
    /// Share amount.
    pub amount: Dec,
}

impl VaultShare {
    /// Creates a share amount.
    pub fn new(denom: impl Into<String>, amount: Dec) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Zero shares of `denom`.
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, Dec::ZERO)
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Checks the denom. Zero amounts pass; positivity is checked by the
    /// containing collection.
    pub fn validate(&self) -> Result<(), ShareError> {
        validate_denom(&self.denom)?;
        Ok(())
    }
}

impl fmt::Display for VaultShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// ---------------------------------------------------------------------------
// VaultShares
// ---------------------------------------------------------------------------

/// Sorted, duplicate-free, strictly positive set of [`VaultShare`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultShares(Vec<VaultShare>);

impl VaultShares {
    /// Builds a canonical set: drops zero entries, sorts by denom, and fails
    /// on duplicate denoms.
    pub fn new(shares: impl IntoIterator<Item = VaultShare>) -> Result<Self, ShareError> {
        let mut shares: Vec<VaultShare> = shares.into_iter().filter(|s| !s.is_zero()).collect();
        shares.sort_by(|a, b| a.denom.cmp(&b.denom));

        if let Some(dup) = shares.windows(2).find(|w| w[0].denom == w[1].denom) {
            return Err(ShareError::DuplicateDenom(dup[0].denom.clone()));
        }

        Ok(Self(shares))
    }

    /// A set holding a single entry, or an empty set if `share` is zero.
    pub fn single(share: VaultShare) -> Self {
        if share.is_zero() {
            Self::default()
        } else {
            Self(vec![share])
        }
    }

    /// Wraps entries as-is, without sorting or pruning. Only for decoding
    /// external data that will be validated afterwards.
    pub fn from_raw(shares: Vec<VaultShare>) -> Self {
        Self(shares)
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates entries in denom order.
    pub fn iter(&self) -> impl Iterator<Item = &VaultShare> {
        self.0.iter()
    }

    /// Denoms held, in order.
    pub fn denoms(&self) -> Vec<String> {
        self.0.iter().map(|s| s.denom.clone()).collect()
    }

    /// Share amount for `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> Dec {
        self.0
            .binary_search_by(|s| s.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount)
            .unwrap_or(Dec::ZERO)
    }

    /// Adds `share` to the set, inserting a new entry if needed.
    pub fn add(&mut self, share: &VaultShare) -> Result<(), ShareError> {
        if share.is_zero() {
            return Ok(());
        }

        match self
            .0
            .binary_search_by(|s| s.denom.as_str().cmp(&share.denom))
        {
            Ok(i) => {
                self.0[i].amount = self.0[i].amount.checked_add(share.amount)?;
            }
            Err(i) => self.0.insert(i, share.clone()),
        }
        Ok(())
    }

    /// Subtracts `share` from the set, removing the entry when it reaches
    /// zero. Fails without modifying anything if the result would be
    /// negative.
    pub fn sub(&mut self, share: &VaultShare) -> Result<(), ShareError> {
        if share.is_zero() {
            return Ok(());
        }

        let i = self
            .0
            .binary_search_by(|s| s.denom.as_str().cmp(&share.denom))
            .map_err(|_| ShareError::Insufficient {
                denom: share.denom.clone(),
                held: Dec::ZERO,
                requested: share.amount,
            })?;

        let held = self.0[i].amount;
        let remaining = held
            .checked_sub(share.amount)
            .map_err(|_| ShareError::Insufficient {
                denom: share.denom.clone(),
                held,
                requested: share.amount,
            })?;

        if remaining.is_zero() {
            self.0.remove(i);
        } else {
            self.0[i].amount = remaining;
        }
        Ok(())
    }

    /// Checks that entries are valid, strictly positive, sorted and unique.
    pub fn validate(&self) -> Result<(), ShareError> {
        for share in &self.0 {
            share.validate()?;
            if share.is_zero() {
                return Err(ShareError::NonPositive(share.denom.clone()));
            }
        }

        for pair in self.0.windows(2) {
            match pair[0].denom.cmp(&pair[1].denom) {
                std::cmp::Ordering::Less => {}
                std::cmp::Ordering::Equal => {
                    return Err(ShareError::DuplicateDenom(pair[0].denom.clone()))
                }
                std::cmp::Ordering::Greater => {
                    return Err(ShareError::Unsorted(pair[1].denom.clone()))
                }
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a VaultShares {
    type Item = &'a VaultShare;
    type IntoIter = std::slice::Iter<'a, VaultShare>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for VaultShares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(","))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
