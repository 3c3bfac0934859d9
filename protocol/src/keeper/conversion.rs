//! # Share Conversion
//!
//! Converts between asset amounts and shares at the vault's current price,
//! `total_value / total_shares`. A [`VaultSnapshot`] freezes both numbers so
//! that every conversion in one call prices against the same state.
//!
//! Both directions compute `x * numerator / denominator` with the multiply
//! done first in 256 bits and a single division at the end. Rounding always
//! favors the vault: issued shares and redeemed assets round down, burned
//! shares round up. Depositors never get more shares than they paid for and
//! withdrawers never get more assets than they own.

use tracing::debug;

use super::error::{EarnError, EarnResult};
use crate::types::{mul_div_ceil, mul_div_floor, Dec};

/// Price basis of one vault at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultSnapshot {
    /// Vault denom.
    pub denom: String,
    /// Outstanding shares.
    pub total_shares: Dec,
    /// Realizable value reported by the strategy.
    pub total_value: u128,
}

impl VaultSnapshot {
    pub fn new(denom: impl Into<String>, total_shares: Dec, total_value: u128) -> Self {
        Self {
            denom: denom.into(),
            total_shares,
            total_value,
        }
    }

    /// Shares that `amount` buys.
    ///
    /// An empty vault issues shares 1:1. Otherwise
    /// `amount * total_shares / total_value`, truncated at 18 decimals.
    pub fn asset_to_shares(&self, amount: u128) -> EarnResult<Dec> {
        if self.total_shares.is_zero() {
            return Ok(Dec::from_int(amount)?);
        }
        if self.total_value == 0 {
            return Err(EarnError::conversion(
                &self.denom,
                format!("{} shares outstanding with zero value", self.total_shares),
            ));
        }

        let atoms = mul_div_floor(amount, self.total_shares.atoms(), self.total_value)
            .ok_or_else(|| EarnError::conversion(&self.denom, "share amount overflow"))?;
        let shares = Dec::from_atoms(atoms);

        debug!(denom = %self.denom, amount, %shares, "asset to shares");
        Ok(shares)
    }

    /// Shares that must be burned to pay out `amount`.
    ///
    /// `amount * total_shares / total_value`, rounded up to the next share
    /// atom, so the burned shares are always worth at least `amount`.
    pub fn shares_to_burn(&self, amount: u128) -> EarnResult<Dec> {
        if self.total_shares.is_zero() || self.total_value == 0 {
            return Err(EarnError::conversion(
                &self.denom,
                format!(
                    "cannot burn against {} shares worth {}",
                    self.total_shares, self.total_value
                ),
            ));
        }

        let atoms = mul_div_ceil(amount, self.total_shares.atoms(), self.total_value)
            .ok_or_else(|| EarnError::conversion(&self.denom, "share amount overflow"))?;
        let shares = Dec::from_atoms(atoms);

        debug!(denom = %self.denom, amount, %shares, "asset to burned shares");
        Ok(shares)
    }

    /// Whole asset units `shares` redeem for.
    ///
    /// `shares * total_value / total_shares`, truncated to an integer.
    pub fn shares_to_asset(&self, shares: Dec) -> EarnResult<u128> {
        if shares.is_zero() {
            return Ok(0);
        }
        if self.total_shares.is_zero() {
            return Err(EarnError::conversion(
                &self.denom,
                "cannot price shares of an empty vault",
            ));
        }

        // Shares are scaled by 10^18 on both sides, so the atom counts
        // divide out and the quotient is already in whole asset units.
        let amount = mul_div_floor(shares.atoms(), self.total_value, self.total_shares.atoms())
            .ok_or_else(|| EarnError::conversion(&self.denom, "asset amount overflow"))?;

        debug!(denom = %self.denom, %shares, amount, "shares to asset");
        Ok(amount)
    }
}
