//! Keeper error taxonomy.
//!
//! Every variant is a local, recoverable failure of a single call: the
//! keeper aborts, leaves the ledger as it was, and hands the error back.

use thiserror::Error;

use crate::bank::BankError;
use crate::storage::StoreError;
use crate::strategy::{StrategyError, StrategyType};
use crate::types::{Address, DecError};
use crate::vault::{ParamsError, ShareError};

/// Errors returned by [`Keeper`](super::Keeper) operations.
#[derive(Debug, Error)]
pub enum EarnError {
    /// No allowed vault serves the denom.
    #[error("invalid vault denom: {0}")]
    InvalidVaultDenom(String),

    /// The vault does not accept the requested strategy, or its
    /// configuration names none.
    #[error("invalid vault strategy {strategy} for {denom}")]
    InvalidVaultStrategy {
        /// Vault denom.
        denom: String,
        /// Strategy requested.
        strategy: StrategyType,
    },

    /// Zero deposit or withdraw amount.
    #[error("insufficient amount: {0} must be positive")]
    InsufficientAmount(String),

    /// The vault holds no shares.
    #[error("vault record not found for {0}")]
    VaultRecordNotFound(String),

    /// The account holds no shares of the vault.
    #[error("vault share record not found for {depositor} in {denom}")]
    VaultShareRecordNotFound {
        /// Account queried.
        depositor: Address,
        /// Vault denom.
        denom: String,
    },

    /// Withdraw exceeds what the account's shares are worth.
    #[error("insufficient value: requested {requested}{denom}, account value {available}{denom}")]
    InsufficientValue {
        /// Vault denom.
        denom: String,
        /// Amount requested.
        requested: u128,
        /// Account's redeemable value.
        available: u128,
    },

    /// Private vault and the account is not on its allow-list.
    #[error("account {depositor} is not allowed to deposit to vault {denom}")]
    AccountNotAllowed {
        /// Rejected account.
        depositor: Address,
        /// Vault denom.
        denom: String,
    },

    /// Configuration names a strategy with no registered implementation.
    #[error("strategy {0} is not registered")]
    StrategyNotRegistered(StrategyType),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Bank(#[from] BankError),

    /// Degenerate share price, or a conversion that rounds to nothing.
    #[error("share conversion failed for {denom}: {reason}")]
    ConversionFailure {
        /// Vault denom.
        denom: String,
        /// What went wrong.
        reason: String,
    },

    #[error(transparent)]
    Shares(#[from] ShareError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dec(#[from] DecError),
}

impl EarnError {
    pub(crate) fn conversion(denom: &str, reason: impl Into<String>) -> Self {
        EarnError::ConversionFailure {
            denom: denom.to_string(),
            reason: reason.into(),
        }
    }
}

pub type EarnResult<T> = Result<T, EarnError>;
