//! Events emitted by successful deposits and withdrawals.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Coin};
use crate::vault::VaultShare;

/// A committed share mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EarnEvent {
    /// Assets went in, shares were issued.
    Deposit {
        depositor: Address,
        amount: Coin,
        shares: VaultShare,
    },
    /// Shares were burned, assets came out.
    Withdraw {
        owner: Address,
        amount: Coin,
        shares: VaultShare,
    },
}

impl EarnEvent {
    /// Vault denom the event concerns.
    pub fn denom(&self) -> &str {
        match self {
            EarnEvent::Deposit { amount, .. } | EarnEvent::Withdraw { amount, .. } => {
                &amount.denom
            }
        }
    }
}
