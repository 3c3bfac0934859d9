//! # Keeper: Deposit/Withdraw Orchestration
//!
//! The [`Keeper`] is the only writer of the share ledger. A deposit or
//! withdraw runs as one sequential step:
//!
//! ```text
//! validate → snapshot price → convert → stage + encode records
//!          → move funds (bank + strategy)
//!          → hooks ↔ persist (order depends on the hook) → event
//! ```
//!
//! Every fallible step except the final storage write happens before the
//! ledger is touched. If a collaborator or the write fails after funds
//! already moved, the keeper reverses the earlier moves and returns the
//! error, so a failed call commits nothing. A `before_vault_deposit_modified`
//! notification is the one thing a failed write cannot take back; the
//! position it reported is still the stored one.
//!
//! ```text
//! conversion.rs   VaultSnapshot: asset ↔ share math
//! deposit.rs      Keeper::deposit
//! withdraw.rs     Keeper::withdraw
//! hooks.rs        EarnHooks observer trait, MultiEarnHooks
//! events.rs       EarnEvent
//! queries.rs      vault and deposit query views
//! invariants.rs   ledger consistency checks
//! error.rs        EarnError
//! ```

pub mod conversion;
pub mod deposit;
pub mod error;
pub mod events;
pub mod hooks;
pub mod invariants;
pub mod queries;
pub mod withdraw;

use std::sync::Arc;

use tracing::debug;

use crate::bank::Bank;
use crate::storage::VaultLedger;
use crate::strategy::{Strategy, StrategyRegistry, StrategyType};
use crate::types::{Address, Coin, Dec};
use crate::vault::{AllowedVault, Params, VaultRecord, VaultShare, VaultShareRecord, VaultShares};

pub use conversion::VaultSnapshot;
pub use error::{EarnError, EarnResult};
pub use events::EarnEvent;
pub use hooks::{EarnHooks, MultiEarnHooks};
pub use queries::{DepositResponse, VaultResponse};

/// Earn module state machine.
pub struct Keeper {
    ledger: VaultLedger,
    bank: Arc<dyn Bank>,
    strategies: StrategyRegistry,
    /// Account that holds pooled vault funds between bank and strategy.
    pool: Address,
    hooks: Option<Box<dyn EarnHooks>>,
    events: Vec<EarnEvent>,
}

impl Keeper {
    pub fn new(
        ledger: VaultLedger,
        bank: Arc<dyn Bank>,
        strategies: StrategyRegistry,
        pool: Address,
    ) -> Self {
        Self {
            ledger,
            bank,
            strategies,
            pool,
            hooks: None,
            events: Vec::new(),
        }
    }

    // -- Hooks --------------------------------------------------------------

    /// Registers the share-change observer.
    ///
    /// # Panics
    ///
    /// If an observer is already registered. Call [`clear_hooks`] first, or
    /// combine observers with [`MultiEarnHooks`].
    ///
    /// [`clear_hooks`]: Keeper::clear_hooks
    pub fn set_hooks(&mut self, hooks: Box<dyn EarnHooks>) -> &mut Self {
        if self.hooks.is_some() {
            panic!("cannot set earn hooks twice");
        }
        self.hooks = Some(hooks);
        self
    }

    /// Removes the registered observer, if any.
    pub fn clear_hooks(&mut self) -> &mut Self {
        self.hooks = None;
        self
    }

    pub fn has_hooks(&self) -> bool {
        self.hooks.is_some()
    }

    pub(crate) fn after_vault_deposit_created(&self, denom: &str, depositor: &Address, shares: Dec) {
        if let Some(hooks) = &self.hooks {
            hooks.after_vault_deposit_created(&self.ledger, denom, depositor, shares);
        }
    }

    pub(crate) fn before_vault_deposit_modified(&self, denom: &str, depositor: &Address, shares: Dec) {
        if let Some(hooks) = &self.hooks {
            hooks.before_vault_deposit_modified(&self.ledger, denom, depositor, shares);
        }
    }

    // -- Events -------------------------------------------------------------

    /// Events emitted since the last drain.
    pub fn events(&self) -> &[EarnEvent] {
        &self.events
    }

    /// Drains buffered events.
    pub fn take_events(&mut self) -> Vec<EarnEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: EarnEvent) {
        self.events.push(event);
    }

    // -- Accessors ----------------------------------------------------------

    pub fn ledger(&self) -> &VaultLedger {
        &self.ledger
    }

    pub fn pool_address(&self) -> &Address {
        &self.pool
    }

    pub fn get_params(&self) -> EarnResult<Params> {
        Ok(self.ledger.get_params()?)
    }

    /// Validates and stores `params`.
    pub fn set_params(&self, params: &Params) -> EarnResult<()> {
        params.validate()?;
        self.ledger.set_params(params)?;
        Ok(())
    }

    /// Configuration serving `denom`, resolving `bnova-*` to `bnova`.
    pub fn get_allowed_vault(&self, denom: &str) -> EarnResult<Option<AllowedVault>> {
        Ok(self.ledger.get_params()?.allowed_vault(denom).cloned())
    }

    pub fn get_vault_record(&self, denom: &str) -> EarnResult<Option<VaultRecord>> {
        Ok(self.ledger.get_vault_record(denom)?)
    }

    pub fn has_vault_record(&self, denom: &str) -> EarnResult<bool> {
        Ok(self.get_vault_record(denom)?.is_some())
    }

    pub fn get_vault_share_record(&self, depositor: &Address) -> EarnResult<Option<VaultShareRecord>> {
        Ok(self.ledger.get_vault_share_record(depositor)?)
    }

    pub fn has_vault_share_record(&self, depositor: &Address) -> EarnResult<bool> {
        Ok(self.get_vault_share_record(depositor)?.is_some())
    }

    /// Outstanding shares of `denom`, `None` if the vault is empty.
    pub fn get_vault_total_shares(&self, denom: &str) -> EarnResult<Option<VaultShare>> {
        Ok(self.get_vault_record(denom)?.map(|r| r.total_shares))
    }

    /// Every vault position held by `depositor`.
    pub fn get_vault_account_shares(&self, depositor: &Address) -> EarnResult<Option<VaultShares>> {
        Ok(self.get_vault_share_record(depositor)?.map(|r| r.shares))
    }

    /// Realizable value of the whole vault, per its primary strategy.
    pub fn get_vault_total_value(&self, denom: &str) -> EarnResult<Coin> {
        let allowed = self.require_allowed_vault(denom)?;
        let strategy = self.route(&allowed)?;
        Ok(strategy.total_realizable_value(denom)?)
    }

    /// What `depositor` would receive for all their shares of `denom`.
    pub fn get_vault_account_value(&self, denom: &str, depositor: &Address) -> EarnResult<Coin> {
        let shares = self
            .get_vault_account_shares(depositor)?
            .ok_or_else(|| EarnError::VaultShareRecordNotFound {
                depositor: depositor.clone(),
                denom: denom.to_string(),
            })?
            .amount_of(denom);

        let snapshot = self.snapshot(denom)?;
        let amount = snapshot.shares_to_asset(shares)?;
        Ok(Coin::new(denom, amount))
    }

    // -- Internals ----------------------------------------------------------

    pub(crate) fn require_allowed_vault(&self, denom: &str) -> EarnResult<AllowedVault> {
        self.get_allowed_vault(denom)?
            .ok_or_else(|| EarnError::InvalidVaultDenom(denom.to_string()))
    }

    /// The strategy funds for `allowed` are routed through.
    pub(crate) fn route(&self, allowed: &AllowedVault) -> EarnResult<Arc<dyn Strategy>> {
        let strategy_type =
            allowed
                .primary_strategy()
                .ok_or_else(|| EarnError::InvalidVaultStrategy {
                    denom: allowed.denom.clone(),
                    strategy: StrategyType::Unspecified,
                })?;
        self.strategies
            .get(strategy_type)
            .ok_or(EarnError::StrategyNotRegistered(strategy_type))
    }

    /// Current price basis of `denom`. Fails if the vault holds no shares.
    pub(crate) fn snapshot(&self, denom: &str) -> EarnResult<VaultSnapshot> {
        let record = self
            .get_vault_record(denom)?
            .ok_or_else(|| EarnError::VaultRecordNotFound(denom.to_string()))?;
        let allowed = self.require_allowed_vault(denom)?;
        let strategy = self.route(&allowed)?;
        self.snapshot_with(&record, strategy.as_ref())
    }

    pub(crate) fn snapshot_with(
        &self,
        record: &VaultRecord,
        strategy: &dyn Strategy,
    ) -> EarnResult<VaultSnapshot> {
        let value = strategy.total_realizable_value(record.denom())?;
        debug!(
            denom = record.denom(),
            total_shares = %record.total(),
            total_value = value.amount,
            "vault snapshot"
        );
        Ok(VaultSnapshot::new(record.denom(), record.total(), value.amount))
    }
}

impl std::fmt::Debug for Keeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keeper")
            .field("pool", &self.pool)
            .field("strategies", &self.strategies)
            .field("has_hooks", &self.hooks.is_some())
            .field("pending_events", &self.events.len())
            .finish()
    }
}
