//! # Vault Records
//!
//! Two record types make up the whole share ledger:
//!
//! - [`VaultRecord`]: total shares outstanding for one vault denom.
//! - [`VaultShareRecord`]: every vault position held by one depositor.
//!
//! Neither record is ever stored at zero. The ledger deletes a vault record
//! whose total reaches zero and a share record whose set becomes empty.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::ShareError;
use super::share::{VaultShare, VaultShares};
use crate::types::{Address, Dec};

// ---------------------------------------------------------------------------
// VaultRecord
// ---------------------------------------------------------------------------

/// Aggregate share total for a single vault denom.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Vault denom and its outstanding shares.
    pub total_shares: VaultShare,
}

impl VaultRecord {
    /// An empty record for `denom`.
    pub fn new(denom: impl Into<String>) -> Self {
        Self {
            total_shares: VaultShare::zero(denom),
        }
    }

    /// A record with an explicit total.
    pub fn with_shares(denom: impl Into<String>, total: Dec) -> Self {
        Self {
            total_shares: VaultShare::new(denom, total),
        }
    }

    /// Vault denom.
    pub fn denom(&self) -> &str {
        &self.total_shares.denom
    }

    /// Outstanding shares.
    pub fn total(&self) -> Dec {
        self.total_shares.amount
    }

    /// Checks the denom.
    pub fn validate(&self) -> Result<(), ShareError> {
        self.total_shares.validate()
    }
}

/// A collection of vault records, as carried by genesis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultRecords(pub Vec<VaultRecord>);

impl VaultRecords {
    /// Every record is valid and no denom repeats.
    pub fn validate(&self) -> Result<(), ShareError> {
        let mut seen = HashSet::new();
        for record in &self.0 {
            record.validate()?;
            if !seen.insert(record.denom()) {
                return Err(ShareError::DuplicateVault(record.denom().to_string()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// VaultShareRecord
// ---------------------------------------------------------------------------

/// All vault positions held by one depositor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultShareRecord {
    /// Position owner.
    pub depositor: Address,
    /// Shares held, one entry per vault.
    pub shares: VaultShares,
}

impl VaultShareRecord {
    /// An empty record for `depositor`.
    pub fn new(depositor: Address) -> Self {
        Self {
            depositor,
            shares: VaultShares::default(),
        }
    }

    /// A record with the given shares.
    pub fn with_shares(depositor: Address, shares: VaultShares) -> Self {
        Self { depositor, shares }
    }

    /// Checks the share set (sorted, unique, positive).
    pub fn validate(&self) -> Result<(), ShareError> {
        self.shares.validate()
    }
}

/// A collection of share records, as carried by genesis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultShareRecords(pub Vec<VaultShareRecord>);

impl VaultShareRecords {
    /// Every record is valid and no depositor repeats.
    pub fn validate(&self) -> Result<(), ShareError> {
        let mut seen = HashSet::new();
        for record in &self.0 {
            record.validate()?;
            if !seen.insert(&record.depositor) {
                return Err(ShareError::DuplicateDepositor(record.depositor.clone()));
            }
        }
        Ok(())
    }
}
