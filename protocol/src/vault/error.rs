//! Record and configuration validation errors.

use thiserror::Error;

use crate::strategy::StrategyType;
use crate::types::{Address, Dec, DecError, DenomError};

/// Errors raised by share arithmetic and record validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// A denom failed validation.
    #[error(transparent)]
    Denom(#[from] DenomError),

    /// Decimal arithmetic failed.
    #[error(transparent)]
    Dec(#[from] DecError),

    /// A share entry is zero where only positive amounts are allowed.
    #[error("share amount for {0} must be positive")]
    NonPositive(String),

    /// The same denom appears twice in one share set.
    #[error("duplicate share denom {0}")]
    DuplicateDenom(String),

    /// Share entries are not in ascending denom order.
    #[error("shares not sorted at denom {0}")]
    Unsorted(String),

    /// A subtraction would take shares below zero.
    #[error("insufficient shares of {denom}: held {held}, requested {requested}")]
    Insufficient {
        /// Denom being subtracted.
        denom: String,
        /// Shares currently held.
        held: Dec,
        /// Shares requested.
        requested: Dec,
    },

    /// Two vault records for the same denom.
    #[error("duplicate vault record for denom {0}")]
    DuplicateVault(String),

    /// Two share records for the same depositor.
    #[error("duplicate depositor {0}")]
    DuplicateDepositor(Address),
}

/// Errors raised by [`AllowedVault`](super::AllowedVault) and
/// [`Params`](super::Params) validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// The vault denom is malformed.
    #[error(transparent)]
    Denom(#[from] DenomError),

    /// No strategies configured.
    #[error("vault {0} must have at least one strategy")]
    NoStrategies(String),

    /// The unspecified strategy tag was configured.
    #[error("invalid strategy")]
    InvalidStrategy,

    /// Same strategy listed twice.
    #[error("duplicate strategy {strategy} for vault {denom}")]
    DuplicateStrategy {
        /// Vault denom.
        denom: String,
        /// Repeated strategy.
        strategy: StrategyType,
    },

    /// Private vault without anyone allowed in.
    #[error("private vaults require non-empty AllowedDepositors")]
    PrivateVaultWithoutDepositors,

    /// Public vault carrying an allow-list.
    #[error("non-private vaults cannot have any AllowedDepositors")]
    PublicVaultWithDepositors,

    /// Same allowed depositor listed twice.
    #[error("duplicate allowed depositor {0}")]
    DuplicateDepositor(Address),

    /// Two allowed vaults with one denom.
    #[error("duplicate vault denom {0}")]
    DuplicateVaultDenom(String),
}
