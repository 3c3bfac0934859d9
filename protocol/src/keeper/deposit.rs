//! Deposit: assets in, shares out.

use tracing::{error, info, warn};

use super::{EarnError, EarnEvent, EarnResult, Keeper, VaultSnapshot};
use crate::storage::{VaultLedger, WriteBatch};
use crate::strategy::{Strategy, StrategyType};
use crate::types::{Address, Coin};
use crate::vault::{VaultRecord, VaultShare, VaultShareRecord};

impl Keeper {
    /// Deposits `amount` from `depositor` into the vault for its denom and
    /// issues shares at the current price.
    ///
    /// `strategy` must be one the vault accepts. Funds always go to the
    /// vault's primary strategy.
    ///
    /// Shares are priced against the vault state before this deposit, so a
    /// depositor is never diluted by their own funds. On any error the
    /// ledger is untouched and the depositor is refunded. No hook fires,
    /// except that a storage write failing after `before_vault_deposit_modified`
    /// leaves that notification delivered for an unchanged position.
    pub fn deposit(
        &mut self,
        depositor: &Address,
        amount: Coin,
        strategy: StrategyType,
    ) -> EarnResult<VaultShare> {
        if amount.is_zero() {
            return Err(EarnError::InsufficientAmount(amount.to_string()));
        }

        let allowed = self.require_allowed_vault(&amount.denom)?;
        if !allowed.is_strategy_allowed(strategy) {
            return Err(EarnError::InvalidVaultStrategy {
                denom: amount.denom.clone(),
                strategy,
            });
        }
        if !allowed.is_account_allowed(depositor) {
            return Err(EarnError::AccountNotAllowed {
                depositor: depositor.clone(),
                denom: amount.denom.clone(),
            });
        }
        let backend = self.route(&allowed)?;

        // Price before any funds move.
        let mut vault_record = self
            .ledger
            .get_vault_record(&amount.denom)?
            .unwrap_or_else(|| VaultRecord::new(&amount.denom));
        let snapshot = if vault_record.total().is_zero() {
            VaultSnapshot::new(&amount.denom, vault_record.total(), 0)
        } else {
            self.snapshot_with(&vault_record, backend.as_ref())?
        };

        let issued = snapshot.asset_to_shares(amount.amount)?;
        if issued.is_zero() {
            return Err(EarnError::conversion(
                &amount.denom,
                format!("deposit of {amount} issues zero shares"),
            ));
        }
        let issued = VaultShare::new(&amount.denom, issued);

        // Stage and encode the new records so arithmetic and serialization
        // failures surface before any funds move.
        let mut share_record = self
            .ledger
            .get_vault_share_record(depositor)?
            .unwrap_or_else(|| VaultShareRecord::new(depositor.clone()));
        let prior = share_record.shares.amount_of(&amount.denom);
        share_record.shares.add(&issued)?;
        vault_record.total_shares.amount = vault_record.total().checked_add(issued.amount)?;
        let batch = VaultLedger::stage_position(&vault_record, &share_record)?;

        self.bank.send(depositor, &self.pool, &amount)?;
        if let Err(err) = backend.deposit(&amount) {
            self.refund(depositor, &amount);
            return Err(err.into());
        }

        if prior.is_zero() {
            self.persist_deposit(depositor, &amount, backend.as_ref(), batch)?;
            self.after_vault_deposit_created(&amount.denom, depositor, issued.amount);
        } else {
            self.before_vault_deposit_modified(&amount.denom, depositor, prior);
            self.persist_deposit(depositor, &amount, backend.as_ref(), batch)?;
        }

        info!(
            depositor = %depositor,
            amount = %amount,
            shares = %issued.amount,
            vault_total = %vault_record.total(),
            "vault deposit"
        );
        self.emit(EarnEvent::Deposit {
            depositor: depositor.clone(),
            amount,
            shares: issued.clone(),
        });

        Ok(issued)
    }

    /// Writes the staged records. If the write fails, the deposit is pulled
    /// back out of the strategy and refunded.
    fn persist_deposit(
        &self,
        depositor: &Address,
        amount: &Coin,
        backend: &dyn Strategy,
        batch: WriteBatch,
    ) -> EarnResult<()> {
        if let Err(err) = self.ledger.commit(batch) {
            error!(depositor = %depositor, amount = %amount, %err, "deposit commit failed, unwinding");
            match backend.withdraw(amount) {
                Ok(()) => self.refund(depositor, amount),
                Err(unwind) => error!(%unwind, "could not recall funds from strategy"),
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Returns pooled funds to `depositor` after a failed deposit.
    fn refund(&self, depositor: &Address, amount: &Coin) {
        warn!(depositor = %depositor, amount = %amount, "refunding failed deposit");
        if let Err(err) = self.bank.send(&self.pool, depositor, amount) {
            error!(depositor = %depositor, amount = %amount, %err, "deposit refund failed");
        }
    }
}
