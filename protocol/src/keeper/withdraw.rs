//! Withdraw: shares burned, assets out.

use tracing::{error, info, warn};

use super::{EarnError, EarnEvent, EarnResult, Keeper};
use crate::storage::{VaultLedger, WriteBatch};
use crate::strategy::{Strategy, StrategyType};
use crate::types::{Address, Coin};
use crate::vault::VaultShare;

impl Keeper {
    /// Withdraws `wanted` from `from`'s position, burning the shares it is
    /// worth at the current price.
    ///
    /// The limit is checked in asset terms: `from` may ask for anything up
    /// to the current value of their shares. Asking for exactly that value
    /// burns every share they hold of the denom. Any other amount burns the
    /// share count rounded up, so the remaining holders never fund the
    /// rounding.
    ///
    /// On any error the ledger is untouched and paid-out funds are returned
    /// to the strategy. No hook fires, except that a storage write failing
    /// after `before_vault_deposit_modified` leaves that notification
    /// delivered for an unchanged position.
    pub fn withdraw(
        &mut self,
        from: &Address,
        wanted: Coin,
        strategy: StrategyType,
    ) -> EarnResult<Coin> {
        if wanted.is_zero() {
            return Err(EarnError::InsufficientAmount(wanted.to_string()));
        }

        let allowed = self.require_allowed_vault(&wanted.denom)?;
        if !allowed.is_strategy_allowed(strategy) {
            return Err(EarnError::InvalidVaultStrategy {
                denom: wanted.denom.clone(),
                strategy,
            });
        }

        let mut vault_record = self
            .ledger
            .get_vault_record(&wanted.denom)?
            .ok_or_else(|| EarnError::VaultRecordNotFound(wanted.denom.clone()))?;

        let share_not_found = || EarnError::VaultShareRecordNotFound {
            depositor: from.clone(),
            denom: wanted.denom.clone(),
        };
        let mut share_record = self
            .ledger
            .get_vault_share_record(from)?
            .ok_or_else(share_not_found)?;
        let held = share_record.shares.amount_of(&wanted.denom);
        if held.is_zero() {
            return Err(share_not_found());
        }

        // One snapshot prices both the limit check and the burn.
        let backend = self.route(&allowed)?;
        let snapshot = self.snapshot_with(&vault_record, backend.as_ref())?;

        let available = snapshot.shares_to_asset(held)?;
        if wanted.amount > available {
            return Err(EarnError::InsufficientValue {
                denom: wanted.denom.clone(),
                requested: wanted.amount,
                available,
            });
        }

        let burned = if wanted.amount == available {
            held
        } else {
            snapshot.shares_to_burn(wanted.amount)?.min(held)
        };
        if burned.is_zero() {
            return Err(EarnError::conversion(
                &wanted.denom,
                format!("withdraw of {wanted} burns zero shares"),
            ));
        }
        let burned = VaultShare::new(&wanted.denom, burned);

        share_record.shares.sub(&burned)?;
        vault_record.total_shares.amount = vault_record.total().checked_sub(burned.amount)?;
        let batch = VaultLedger::stage_position(&vault_record, &share_record)?;

        backend.withdraw(&wanted)?;
        if let Err(err) = self.bank.send(&self.pool, from, &wanted) {
            warn!(owner = %from, amount = %wanted, %err, "payout failed, returning funds to strategy");
            return_to_strategy(backend.as_ref(), from, &wanted);
            return Err(err.into());
        }

        self.before_vault_deposit_modified(&wanted.denom, from, held);
        self.persist_withdraw(from, &wanted, backend.as_ref(), batch)?;

        info!(
            owner = %from,
            amount = %wanted,
            shares = %burned.amount,
            vault_total = %vault_record.total(),
            "vault withdraw"
        );
        self.emit(EarnEvent::Withdraw {
            owner: from.clone(),
            amount: wanted.clone(),
            shares: burned,
        });

        Ok(wanted)
    }

    /// Writes the staged records. If the write fails, the payout is taken
    /// back from `from` and returned to the strategy.
    fn persist_withdraw(
        &self,
        from: &Address,
        paid: &Coin,
        backend: &dyn Strategy,
        batch: WriteBatch,
    ) -> EarnResult<()> {
        if let Err(err) = self.ledger.commit(batch) {
            error!(owner = %from, amount = %paid, %err, "withdraw commit failed, unwinding");
            match self.bank.send(from, &self.pool, paid) {
                Ok(()) => return_to_strategy(backend, from, paid),
                Err(unwind) => error!(owner = %from, amount = %paid, %unwind, "could not reclaim payout"),
            }
            return Err(err.into());
        }
        Ok(())
    }
}

fn return_to_strategy(backend: &dyn Strategy, owner: &Address, amount: &Coin) {
    if let Err(unwind) = backend.deposit(amount) {
        error!(owner = %owner, amount = %amount, %unwind, "could not return funds to strategy");
    }
}
