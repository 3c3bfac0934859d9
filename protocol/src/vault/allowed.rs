//! # Vault Configuration
//!
//! [`Params`] is the governance-owned list of [`AllowedVault`]s. The keeper
//! only reads it: which denoms accept deposits, which strategies each one
//! may route through, and who may deposit into private vaults.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::ParamsError;
use crate::config::{is_derivative_denom, DERIVATIVE_VAULT_DENOM};
use crate::strategy::StrategyType;
use crate::types::{validate_denom, Address};

// ---------------------------------------------------------------------------
// AllowedVault
// ---------------------------------------------------------------------------

/// Configuration for one vault denom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedVault {
    /// Vault denom. `bnova` serves every `bnova-<validator>` denom.
    pub denom: String,

    /// Strategies deposits may name. The first one is where funds go.
    pub strategies: Vec<StrategyType>,

    /// Only `allowed_depositors` may deposit.
    #[serde(default)]
    pub is_private_vault: bool,

    /// Allow-list for private vaults. Must be empty for public ones.
    #[serde(default)]
    pub allowed_depositors: Vec<Address>,
}

impl AllowedVault {
    /// A public vault.
    pub fn new(denom: impl Into<String>, strategies: Vec<StrategyType>) -> Self {
        Self {
            denom: denom.into(),
            strategies,
            is_private_vault: false,
            allowed_depositors: Vec::new(),
        }
    }

    /// A private vault restricted to `allowed_depositors`.
    pub fn private(
        denom: impl Into<String>,
        strategies: Vec<StrategyType>,
        allowed_depositors: Vec<Address>,
    ) -> Self {
        Self {
            denom: denom.into(),
            strategies,
            is_private_vault: true,
            allowed_depositors,
        }
    }

    /// Returns `true` if `strategy` is configured for this vault.
    pub fn is_strategy_allowed(&self, strategy: StrategyType) -> bool {
        self.strategies.contains(&strategy)
    }

    /// Returns `true` if `account` may deposit.
    pub fn is_account_allowed(&self, account: &Address) -> bool {
        !self.is_private_vault || self.allowed_depositors.contains(account)
    }

    /// The strategy funds are routed through.
    pub fn primary_strategy(&self) -> Option<StrategyType> {
        self.strategies.first().copied()
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        validate_denom(&self.denom)?;

        if self.strategies.is_empty() {
            return Err(ParamsError::NoStrategies(self.denom.clone()));
        }

        let mut seen = HashSet::new();
        for strategy in &self.strategies {
            if *strategy == StrategyType::Unspecified {
                return Err(ParamsError::InvalidStrategy);
            }
            if !seen.insert(*strategy) {
                return Err(ParamsError::DuplicateStrategy {
                    denom: self.denom.clone(),
                    strategy: *strategy,
                });
            }
        }

        if self.is_private_vault && self.allowed_depositors.is_empty() {
            return Err(ParamsError::PrivateVaultWithoutDepositors);
        }
        if !self.is_private_vault && !self.allowed_depositors.is_empty() {
            return Err(ParamsError::PublicVaultWithDepositors);
        }

        let mut depositors = HashSet::new();
        for depositor in &self.allowed_depositors {
            if !depositors.insert(depositor) {
                return Err(ParamsError::DuplicateDepositor(depositor.clone()));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Earn module parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub allowed_vaults: Vec<AllowedVault>,
}

impl Params {
    pub fn new(allowed_vaults: Vec<AllowedVault>) -> Self {
        Self { allowed_vaults }
    }

    /// Looks up the configuration serving `denom`.
    ///
    /// An exact match wins. Otherwise staking derivative denoms
    /// (`bnova-<validator>`) resolve to the `bnova` entry.
    pub fn allowed_vault(&self, denom: &str) -> Option<&AllowedVault> {
        self.find(denom).or_else(|| {
            if is_derivative_denom(denom) {
                self.find(DERIVATIVE_VAULT_DENOM)
            } else {
                None
            }
        })
    }

    fn find(&self, denom: &str) -> Option<&AllowedVault> {
        self.allowed_vaults.iter().find(|v| v.denom == denom)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let mut seen = HashSet::new();
        for vault in &self.allowed_vaults {
            vault.validate()?;
            if !seen.insert(vault.denom.as_str()) {
                return Err(ParamsError::DuplicateVaultDenom(vault.denom.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes(vec![byte; 20]).unwrap()
    }

    #[test]
    fn test_public_vault_allows_everyone() {
        let vault = AllowedVault::new("usdx", vec![StrategyType::Hard]);
        assert!(vault.validate().is_ok());
        assert!(vault.is_account_allowed(&addr(9)));
        assert!(vault.is_strategy_allowed(StrategyType::Hard));
        assert!(!vault.is_strategy_allowed(StrategyType::Savings));
        assert_eq!(vault.primary_strategy(), Some(StrategyType::Hard));
    }

    #[test]
    fn test_private_vault_checks_allow_list() {
        let vault = AllowedVault::private("usdx", vec![StrategyType::Savings], vec![addr(1)]);
        assert!(vault.validate().is_ok());
        assert!(vault.is_account_allowed(&addr(1)));
        assert!(!vault.is_account_allowed(&addr(2)));
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let unspecified = AllowedVault::new("usdx", vec![StrategyType::Unspecified]);
        assert_eq!(unspecified.validate(), Err(ParamsError::InvalidStrategy));

        let none = AllowedVault::new("usdx", vec![]);
        assert!(matches!(none.validate(), Err(ParamsError::NoStrategies(_))));

        let dup = AllowedVault::new("usdx", vec![StrategyType::Hard, StrategyType::Hard]);
        assert!(matches!(
            dup.validate(),
            Err(ParamsError::DuplicateStrategy { .. })
        ));

        let private_empty = AllowedVault::private("usdx", vec![StrategyType::Hard], vec![]);
        assert_eq!(
            private_empty.validate(),
            Err(ParamsError::PrivateVaultWithoutDepositors)
        );

        let mut public_listed = AllowedVault::new("usdx", vec![StrategyType::Hard]);
        public_listed.allowed_depositors.push(addr(1));
        assert_eq!(
            public_listed.validate(),
            Err(ParamsError::PublicVaultWithDepositors)
        );
    }

    #[test]
    fn test_params_reject_duplicate_vault() {
        let params = Params::new(vec![
            AllowedVault::new("usdx", vec![StrategyType::Hard]),
            AllowedVault::new("usdx", vec![StrategyType::Savings]),
        ]);
        assert_eq!(
            params.validate().unwrap_err().to_string(),
            "duplicate vault denom usdx"
        );
    }

    #[test]
    fn test_derivative_denoms_resolve_to_aggregate_vault() {
        let params = Params::new(vec![
            AllowedVault::new("usdx", vec![StrategyType::Hard]),
            AllowedVault::new("bnova", vec![StrategyType::Savings]),
        ]);
        assert_eq!(params.allowed_vault("bnova-val1").unwrap().denom, "bnova");
        assert_eq!(params.allowed_vault("bnova").unwrap().denom, "bnova");
        assert!(params.allowed_vault("bnovax-val1").is_none());
        assert!(params.allowed_vault("busd").is_none());
    }
}
