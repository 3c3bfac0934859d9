//! # Query Views
//!
//! Read-only views over the ledger joined with vault configuration and
//! live strategy values. Nothing here writes.

use serde::{Deserialize, Serialize};

use super::{EarnError, EarnResult, Keeper};
use crate::config::{is_derivative_denom, DERIVATIVE_VAULT_DENOM};
use crate::strategy::StrategyType;
use crate::types::{coin::amount_string, Address, Coin, Dec};
use crate::vault::{AllowedVault, VaultShareRecord, VaultShares};

/// One vault: configuration, shares and value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultResponse {
    pub denom: String,
    pub strategies: Vec<StrategyType>,
    pub is_private_vault: bool,
    pub allowed_depositors: Vec<Address>,
    pub total_shares: Dec,
    #[serde(with = "amount_string")]
    pub total_value: u128,
}

impl VaultResponse {
    fn new(denom: &str, allowed: &AllowedVault, total_shares: Dec, total_value: u128) -> Self {
        Self {
            denom: denom.to_string(),
            strategies: allowed.strategies.clone(),
            is_private_vault: allowed.is_private_vault,
            allowed_depositors: allowed.allowed_depositors.clone(),
            total_shares,
            total_value,
        }
    }
}

/// One depositor: every share they hold and what it is worth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositResponse {
    pub depositor: Address,
    pub shares: VaultShares,
    pub value: Vec<Coin>,
}

impl Keeper {
    /// Every vault that currently holds deposits, in denom order.
    ///
    /// Iterates vault records rather than configuration so that each
    /// `bnova-*` derivative vault shows up on its own.
    pub fn vaults(&self) -> EarnResult<Vec<VaultResponse>> {
        let mut vaults = Vec::new();
        for record in self.ledger.iterate_vault_records()? {
            let allowed = self.require_allowed_vault(record.denom())?;
            let value = self.get_vault_total_value(record.denom())?;
            vaults.push(VaultResponse::new(
                record.denom(),
                &allowed,
                record.total(),
                value.amount,
            ));
        }
        Ok(vaults)
    }

    /// A single vault. Configured vaults without deposits report zero.
    ///
    /// `bnova` itself reports the summed value of every `bnova-*` vault
    /// and zero shares, since shares of different derivative vaults are
    /// not comparable.
    pub fn vault(&self, denom: &str) -> EarnResult<VaultResponse> {
        let allowed = self.require_allowed_vault(denom)?;

        if denom == DERIVATIVE_VAULT_DENOM {
            let mut total_value: u128 = 0;
            for record in self.ledger.iterate_vault_records()? {
                if !is_derivative_denom(record.denom()) {
                    continue;
                }
                let value = self.get_vault_total_value(record.denom())?;
                total_value = total_value.checked_add(value.amount).ok_or_else(|| {
                    EarnError::conversion(denom, "aggregate value overflow")
                })?;
            }
            return Ok(VaultResponse::new(denom, &allowed, Dec::ZERO, total_value));
        }

        let total_shares = self
            .ledger
            .get_vault_record(denom)?
            .map(|r| r.total())
            .unwrap_or(Dec::ZERO);
        let value = self.get_vault_total_value(denom)?;
        Ok(VaultResponse::new(denom, &allowed, total_shares, value.amount))
    }

    /// Deposits, filtered by depositor and/or vault denom.
    ///
    /// | depositor | denom | result                                        |
    /// |-----------|-------|-----------------------------------------------|
    /// | some      | some  | that depositor, if they hold shares of denom  |
    /// | none      | some  | every depositor holding shares of denom       |
    /// | some      | none  | that depositor                                |
    /// | none      | none  | every depositor                               |
    ///
    /// Each entry carries the depositor's full share set.
    pub fn deposits(
        &self,
        depositor: Option<&Address>,
        denom: Option<&str>,
    ) -> EarnResult<Vec<DepositResponse>> {
        match (depositor, denom) {
            (Some(depositor), denom) => {
                let record = self.ledger.get_vault_share_record(depositor)?.ok_or_else(|| {
                    EarnError::VaultShareRecordNotFound {
                        depositor: depositor.clone(),
                        denom: denom.unwrap_or_default().to_string(),
                    }
                })?;
                if let Some(denom) = denom {
                    if record.shares.amount_of(denom).is_zero() {
                        return Err(EarnError::VaultShareRecordNotFound {
                            depositor: depositor.clone(),
                            denom: denom.to_string(),
                        });
                    }
                }
                Ok(vec![self.deposit_response(record)?])
            }
            (None, Some(denom)) => {
                if self.ledger.get_vault_record(denom)?.is_none() {
                    return Err(EarnError::VaultRecordNotFound(denom.to_string()));
                }
                self.ledger
                    .iterate_vault_share_records()?
                    .into_iter()
                    .filter(|r| !r.shares.amount_of(denom).is_zero())
                    .map(|r| self.deposit_response(r))
                    .collect()
            }
            (None, None) => self
                .ledger
                .iterate_vault_share_records()?
                .into_iter()
                .map(|r| self.deposit_response(r))
                .collect(),
        }
    }

    fn deposit_response(&self, record: VaultShareRecord) -> EarnResult<DepositResponse> {
        let value = record
            .shares
            .iter()
            .map(|share| self.get_vault_account_value(&share.denom, &record.depositor))
            .collect::<EarnResult<Vec<Coin>>>()?;
        Ok(DepositResponse {
            depositor: record.depositor,
            shares: record.shares,
            value,
        })
    }
}
