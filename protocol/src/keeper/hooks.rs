//! # Earn Hooks
//!
//! Observers that need to snapshot a depositor's shares at exact points,
//! reward accrual being the obvious one, implement [`EarnHooks`].
//!
//! | Hook                            | When                                   | Ledger shows |
//! |---------------------------------|----------------------------------------|--------------|
//! | `after_vault_deposit_created`   | first deposit into a vault             | new shares   |
//! | `before_vault_deposit_modified` | any later deposit, and every withdraw  | old shares   |
//!
//! Both receive the ledger so an observer can re-read state from inside the
//! callback. At most one observer is registered on a keeper; use
//! [`MultiEarnHooks`] to fan out to several.

use crate::storage::VaultLedger;
use crate::types::{Address, Dec};

/// Share-change observer.
pub trait EarnHooks: Send + Sync {
    /// Called after a depositor's first shares of `vault_denom` have been
    /// written. `shares_owned` is the amount just issued.
    fn after_vault_deposit_created(
        &self,
        ledger: &VaultLedger,
        vault_denom: &str,
        depositor: &Address,
        shares_owned: Dec,
    );

    /// Called before an existing position in `vault_denom` changes.
    /// `shares_owned` is the balance before the change.
    fn before_vault_deposit_modified(
        &self,
        ledger: &VaultLedger,
        vault_denom: &str,
        depositor: &Address,
        shares_owned: Dec,
    );
}

/// Runs several observers in registration order.
#[derive(Default)]
pub struct MultiEarnHooks {
    hooks: Vec<Box<dyn EarnHooks>>,
}

impl MultiEarnHooks {
    pub fn new(hooks: Vec<Box<dyn EarnHooks>>) -> Self {
        Self { hooks }
    }

    pub fn push(&mut self, hooks: Box<dyn EarnHooks>) {
        self.hooks.push(hooks);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl EarnHooks for MultiEarnHooks {
    fn after_vault_deposit_created(
        &self,
        ledger: &VaultLedger,
        vault_denom: &str,
        depositor: &Address,
        shares_owned: Dec,
    ) {
        for hook in &self.hooks {
            hook.after_vault_deposit_created(ledger, vault_denom, depositor, shares_owned);
        }
    }

    fn before_vault_deposit_modified(
        &self,
        ledger: &VaultLedger,
        vault_denom: &str,
        depositor: &Address,
        shares_owned: Dec,
    ) {
        for hook in &self.hooks {
            hook.before_vault_deposit_modified(ledger, vault_denom, depositor, shares_owned);
        }
    }
}
