//! # Bank Capability
//!
//! The earn module does not keep account balances. Moving the underlying
//! asset between a depositor and the vault pool account is delegated to the
//! chain's bank through the [`Bank`] trait.

use thiserror::Error;

use crate::types::{Address, Coin};

/// Errors returned by the bank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// The sender does not hold enough of the coin.
    #[error("insufficient funds: {address} has {available}{denom}, needs {requested}{denom}")]
    InsufficientFunds {
        /// Sending account.
        address: Address,
        /// Denom being sent.
        denom: String,
        /// Sender balance.
        available: u128,
        /// Amount requested.
        requested: u128,
    },

    /// Any other bank-side failure.
    #[error("bank error: {0}")]
    Other(String),
}

/// Asset transfer capability.
pub trait Bank: Send + Sync {
    /// Moves `coin` from `from` to `to`.
    fn send(&self, from: &Address, to: &Address, coin: &Coin) -> Result<(), BankError>;

    /// `address`'s balance of `denom`.
    fn balance(&self, address: &Address, denom: &str) -> u128;
}
