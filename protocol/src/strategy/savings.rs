//! Savings pool strategy. Holds the vault's funds as a plain savings
//! deposit of the pool account; the staking derivative vaults run on this.

use std::sync::Arc;

use tracing::debug;

use super::{Strategy, StrategyError, StrategyType};
use crate::types::{Address, Coin};

/// External savings pool capability.
pub trait SavingsPool: Send + Sync {
    /// `owner`'s savings deposit. Empty when there is none.
    fn deposit_of(&self, owner: &Address) -> Result<Vec<Coin>, StrategyError>;

    fn deposit(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError>;

    fn withdraw(&self, owner: &Address, amount: &Coin) -> Result<(), StrategyError>;
}

/// [`Strategy`] backed by a [`SavingsPool`].
pub struct SavingsStrategy {
    pool: Arc<dyn SavingsPool>,
    owner: Address,
}

impl SavingsStrategy {
    pub fn new(pool: Arc<dyn SavingsPool>, owner: Address) -> Self {
        Self { pool, owner }
    }
}

impl Strategy for SavingsStrategy {
    fn strategy_type(&self) -> StrategyType {
        StrategyType::Savings
    }

    fn total_realizable_value(&self, denom: &str) -> Result<Coin, StrategyError> {
        let amount = self
            .pool
            .deposit_of(&self.owner)?
            .into_iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0);
        Ok(Coin::new(denom, amount))
    }

    fn deposit(&self, amount: &Coin) -> Result<(), StrategyError> {
        debug!(coin = %amount, "depositing to savings");
        self.pool.deposit(&self.owner, amount)
    }

    fn withdraw(&self, amount: &Coin) -> Result<(), StrategyError> {
        debug!(coin = %amount, "withdrawing from savings");
        self.pool.withdraw(&self.owner, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Pool {
        coins: Mutex<Vec<Coin>>,
    }

    impl SavingsPool for Pool {
        fn deposit_of(&self, _owner: &Address) -> Result<Vec<Coin>, StrategyError> {
            Ok(self.coins.lock().clone())
        }

        fn deposit(&self, _owner: &Address, amount: &Coin) -> Result<(), StrategyError> {
            if !amount.denom.starts_with("bnova-") && amount.denom != "unova" {
                return Err(StrategyError::UnsupportedDenom(amount.denom.clone()));
            }
            self.coins.lock().push(amount.clone());
            Ok(())
        }

        fn withdraw(&self, _owner: &Address, _amount: &Coin) -> Result<(), StrategyError> {
            Err(StrategyError::Backend("withdrawals paused".into()))
        }
    }

    fn owner() -> Address {
        Address::from_bytes(b"earn-pool".to_vec()).unwrap()
    }

    #[test]
    fn test_value_per_denom() {
        let strategy = SavingsStrategy::new(Arc::new(Pool::default()), owner());
        strategy.deposit(&Coin::new("bnova-val1", 40)).unwrap();
        strategy.deposit(&Coin::new("unova", 7)).unwrap();

        assert_eq!(strategy.total_realizable_value("bnova-val1").unwrap().amount, 40);
        assert_eq!(strategy.total_realizable_value("unova").unwrap().amount, 7);
        assert_eq!(strategy.total_realizable_value("bnova-val2").unwrap().amount, 0);
    }

    #[test]
    fn test_backend_errors_surface() {
        let strategy = SavingsStrategy::new(Arc::new(Pool::default()), owner());
        assert_eq!(
            strategy.deposit(&Coin::new("usdx", 1)),
            Err(StrategyError::UnsupportedDenom("usdx".into()))
        );
        assert!(matches!(
            strategy.withdraw(&Coin::new("unova", 1)),
            Err(StrategyError::Backend(_))
        ));
    }
}
