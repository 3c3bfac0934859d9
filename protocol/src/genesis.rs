//! # Genesis Import & Export
//!
//! Genesis is the whole earn state as one JSON document: params plus every
//! vault record and share record. Import validates everything, including
//! the per-denom share totals, before writing a single key. A failed import
//! leaves the store exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::storage::{StoreError, VaultLedger};
use crate::types::{Dec, DecError};
use crate::vault::{
    ParamsError, Params, ShareError, VaultRecord, VaultRecords, VaultShareRecord,
    VaultShareRecords,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while validating or importing genesis state.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("invalid params: {0}")]
    Params(#[from] ParamsError),

    #[error("invalid records: {0}")]
    Records(#[from] ShareError),

    /// A vault record total disagrees with its depositors.
    #[error("vault {denom} total shares {total} do not match depositor shares {sum}")]
    SharesMismatch {
        /// Vault denom.
        denom: String,
        /// Recorded total.
        total: Dec,
        /// Sum over share records.
        sum: Dec,
    },

    /// A vault record with zero total shares.
    #[error("vault record {0} has zero shares")]
    EmptyVaultRecord(String),

    /// A share record with no entries.
    #[error("share record for {0} is empty")]
    EmptyShareRecord(String),

    #[error(transparent)]
    Dec(#[from] DecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("genesis json: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// GenesisState
// ---------------------------------------------------------------------------

/// Complete earn module state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    #[serde(default)]
    pub vault_records: VaultRecords,
    #[serde(default)]
    pub vault_share_records: VaultShareRecords,
}

impl GenesisState {
    pub fn new(
        params: Params,
        vault_records: VaultRecords,
        vault_share_records: VaultShareRecords,
    ) -> Self {
        Self {
            params,
            vault_records,
            vault_share_records,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, GenesisError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, GenesisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Full validation: params, each record, no zero records, and for every
    /// denom the vault total equals the sum of depositor shares.
    pub fn validate(&self) -> Result<(), GenesisError> {
        self.params.validate()?;
        self.vault_records.validate()?;
        self.vault_share_records.validate()?;

        if let Some(empty) = self.vault_records.0.iter().find(|r| r.total().is_zero()) {
            return Err(GenesisError::EmptyVaultRecord(empty.denom().to_string()));
        }
        if let Some(empty) = self
            .vault_share_records
            .0
            .iter()
            .find(|r| r.shares.is_empty())
        {
            return Err(GenesisError::EmptyShareRecord(empty.depositor.to_string()));
        }

        let mut sums: BTreeMap<&str, Dec> = BTreeMap::new();
        for record in &self.vault_share_records.0 {
            for share in &record.shares {
                let sum = sums.entry(share.denom.as_str()).or_default();
                *sum = sum.checked_add(share.amount)?;
            }
        }

        for record in &self.vault_records.0 {
            let sum = sums.remove(record.denom()).unwrap_or(Dec::ZERO);
            if sum != record.total() {
                return Err(GenesisError::SharesMismatch {
                    denom: record.denom().to_string(),
                    total: record.total(),
                    sum,
                });
            }
        }

        // Shares held in a vault that has no record.
        if let Some((denom, sum)) = sums.into_iter().next() {
            return Err(GenesisError::SharesMismatch {
                denom: denom.to_string(),
                total: Dec::ZERO,
                sum,
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Import / Export
// ---------------------------------------------------------------------------

/// Validates `state` and writes it to `ledger` in one batch.
pub fn init_genesis(ledger: &VaultLedger, state: &GenesisState) -> Result<(), GenesisError> {
    state.validate()?;
    ledger.import(
        &state.params,
        &state.vault_records.0,
        &state.vault_share_records.0,
    )?;

    info!(
        allowed_vaults = state.params.allowed_vaults.len(),
        vault_records = state.vault_records.0.len(),
        share_records = state.vault_share_records.0.len(),
        "earn genesis imported"
    );
    Ok(())
}

/// Reads the full earn state from `ledger`, records in ascending key order.
pub fn export_genesis(ledger: &VaultLedger) -> Result<GenesisState, GenesisError> {
    let params = ledger.get_params()?;
    let vault_records: Vec<VaultRecord> = ledger.iterate_vault_records()?;
    let share_records: Vec<VaultShareRecord> = ledger.iterate_vault_share_records()?;

    Ok(GenesisState::new(
        params,
        VaultRecords(vault_records),
        VaultShareRecords(share_records),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyType;
    use crate::types::Address;
    use crate::vault::{AllowedVault, VaultShare, VaultShares};

    fn dec(n: u128) -> Dec {
        Dec::from_int(n).unwrap()
    }

    fn addr(byte: u8) -> Address {
        Address::from_bytes(vec![byte; 20]).unwrap()
    }

    fn sample() -> GenesisState {
        GenesisState::new(
            Params::new(vec![
                AllowedVault::new("usdx", vec![StrategyType::Hard]),
                AllowedVault::new("bnova", vec![StrategyType::Savings]),
            ]),
            VaultRecords(vec![
                VaultRecord::with_shares("bnova-val1", dec(5)),
                VaultRecord::with_shares("usdx", dec(30)),
            ]),
            VaultShareRecords(vec![
                VaultShareRecord::with_shares(
                    addr(1),
                    VaultShares::new(vec![
                        VaultShare::new("usdx", dec(10)),
                        VaultShare::new("bnova-val1", dec(5)),
                    ])
                    .unwrap(),
                ),
                VaultShareRecord::with_shares(
                    addr(2),
                    VaultShares::single(VaultShare::new("usdx", dec(20))),
                ),
            ]),
        )
    }

    #[test]
    fn test_default_is_valid() {
        assert!(GenesisState::default().validate().is_ok());
    }

    #[test]
    fn test_import_export_roundtrip() {
        let ledger = VaultLedger::in_memory();
        let state = sample();
        init_genesis(&ledger, &state).unwrap();

        let exported = export_genesis(&ledger).unwrap();
        assert_eq!(exported, state);

        let json = exported.to_json_pretty().unwrap();
        assert_eq!(GenesisState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn test_mismatch_aborts_without_writes() {
        let ledger = VaultLedger::in_memory();
        let mut state = sample();
        state.vault_records.0[1] = VaultRecord::with_shares("usdx", dec(31));

        let err = init_genesis(&ledger, &state).unwrap_err();
        assert!(matches!(err, GenesisError::SharesMismatch { ref denom, .. } if denom == "usdx"));
        assert!(ledger.iterate_vault_records().unwrap().is_empty());
        assert_eq!(ledger.get_params().unwrap(), Params::default());
    }

    #[test]
    fn test_shares_without_vault_record_rejected() {
        let mut state = sample();
        state.vault_records.0.remove(0);
        assert!(matches!(
            state.validate(),
            Err(GenesisError::SharesMismatch { total, .. }) if total == Dec::ZERO
        ));
    }

    #[test]
    fn test_zero_vault_record_rejected() {
        let mut state = GenesisState::default();
        state.vault_records.0.push(VaultRecord::new("usdx"));
        assert!(matches!(
            state.validate(),
            Err(GenesisError::EmptyVaultRecord(_))
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut state = sample();
        state
            .params
            .allowed_vaults
            .push(AllowedVault::new("usdx", vec![StrategyType::Savings]));
        assert!(matches!(state.validate(), Err(GenesisError::Params(_))));
    }
}
