//! Money-market lending strategy.
//!
//! Funds are supplied to the lending market from the vault pool account.
//! Supplied balances accrue interest lazily, so the value read has to come
//! from the market's interest-synced view or early withdrawers would be paid
//! at a stale price.

use std::sync::Arc;

use tracing::debug;

use super::{Strategy, StrategyError, StrategyType};
use crate::types::{Address, Coin};

/// External lending market capability.
pub trait LendingMarket: Send + Sync {
    /// `owner`'s supplied balances with accrued interest applied.
    /// Empty when `owner` has supplied nothing.
    fn synced_deposit(&self, owner: &Address) -> Result<Vec<Coin>, StrategyError>;

    /// Supplies `amount` from `owner`.
    fn deposit(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError>;

    /// Withdraws `amount` of `owner`'s supply back to `owner`.
    fn withdraw(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError>;
}

/// [`Strategy`] backed by a [`LendingMarket`].
pub struct HardStrategy {
    market: Arc<dyn LendingMarket>,
    pool: Address,
}

impl HardStrategy {
    pub fn new(market: Arc<dyn LendingMarket>, pool: Address) -> Self {
        Self { market, pool }
    }
}

impl Strategy for HardStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Hard
    }

    fn total_realizable_value(&self, denom: &str) -> Result<Coin, StrategyError> {
        let supplied = self.market.synced_deposit(&self.pool)?;
        let amount = supplied
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0);
        Ok(Coin::new(denom, amount))
    }

    fn deposit(&self, amount: &Coin) -> Result<(), StrategyError> {
        debug!(coin = %amount, "supplying to lending market");
        self.market.deposit(&self.pool, amount)
    }

    fn withdraw(&self, amount: &Coin) -> Result<(), StrategyError> {
        debug!(coin = %amount, "withdrawing from lending market");
        self.market.withdraw(&self.pool, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Market that pays a flat interest bonus once synced.
    #[derive(Default)]
    struct Market {
        supplied: Mutex<HashMap<String, u128>>,
        accrued: u128,
    }

    impl LendingMarket for Market {
        fn synced_deposit(&self, _owner: &Address) -> Result<Vec<Coin>, StrategyError> {
            Ok(self
                .supplied
                .lock()
                .iter()
                .map(|(d, a)| Coin::new(d.clone(), a + self.accrued))
                .collect())
        }

        fn deposit(&self, _owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
            *self.supplied.lock().entry(amount.denom.clone()).or_default() += amount.amount;
            Ok(())
        }

        fn withdraw(&self, _owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
            let mut supplied = self.supplied.lock();
            let held = supplied.entry(amount.denom.clone()).or_default();
            if *held < amount.amount {
                return Err(StrategyError::InsufficientBackendBalance {
                    denom: amount.denom.clone(),
                    available: *held,
                    requested: amount.amount,
                });
            }
            *held -= amount.amount;
            Ok(())
        }
    }

    fn pool() -> Address {
        Address::from_bytes(b"earn-pool".to_vec()).unwrap()
    }

    #[test]
    fn test_value_is_zero_without_position() {
        let strategy = HardStrategy::new(Arc::new(Market::default()), pool());
        assert_eq!(
            strategy.total_realizable_value("usdx").unwrap(),
            Coin::zero("usdx")
        );
    }

    #[test]
    fn test_value_includes_synced_interest() {
        let market = Arc::new(Market {
            accrued: 5,
            ..Default::default()
        });
        let strategy = HardStrategy::new(market, pool());
        strategy.deposit(&Coin::new("usdx", 100)).unwrap();
        assert_eq!(strategy.total_realizable_value("usdx").unwrap().amount, 105);
    }

    #[test]
    fn test_withdraw_propagates_backend_rejection() {
        let strategy = HardStrategy::new(Arc::new(Market::default()), pool());
        strategy.deposit(&Coin::new("usdx", 10)).unwrap();
        let err = strategy.withdraw(&Coin::new("usdx", 11)).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::InsufficientBackendBalance { available: 10, .. }
        ));
    }
}
