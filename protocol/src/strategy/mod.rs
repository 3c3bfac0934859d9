//! # Strategies: Yield Backends
//!
//! A strategy is where a vault's pooled funds actually sit while they earn.
//! The keeper never looks inside one; it asks three things:
//!
//! - how much the vault's position is worth right now,
//! - put this much in,
//! - take this much out.
//!
//! Each backend is one [`StrategyType`] variant. A vault's configuration
//! names the variants it accepts and the keeper dispatches on that tag
//! through the [`StrategyRegistry`], never on the concrete type.
//!
//! ```text
//! hard.rs      HardStrategy over a LendingMarket (money market supply)
//! savings.rs   SavingsStrategy over a SavingsPool
//! ```

pub mod hard;
pub mod savings;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Coin;

pub use hard::{HardStrategy, LendingMarket};
pub use savings::{SavingsPool, SavingsStrategy};

// ---------------------------------------------------------------------------
// StrategyType
// ---------------------------------------------------------------------------

/// Tag identifying a yield backend.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// Never valid in configuration. Exists so a missing tag decodes to
    /// something validation can reject.
    #[default]
    Unspecified,
    /// Supply to the lending money market.
    Hard,
    /// Deposit into the savings pool.
    Savings,
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyType::Unspecified => "unspecified",
            StrategyType::Hard => "hard",
            StrategyType::Savings => "savings",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by a strategy or its backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// The backend rejected the operation.
    #[error("strategy backend error: {0}")]
    Backend(String),

    /// The backend holds less than was asked for.
    #[error("insufficient backend balance of {denom}: available {available}, requested {requested}")]
    InsufficientBackendBalance {
        /// Denom requested.
        denom: String,
        /// Amount the backend holds for the pool.
        available: u128,
        /// Amount requested.
        requested: u128,
    },

    /// The backend does not handle this denom.
    #[error("unsupported denom {0}")]
    UnsupportedDenom(String),
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// A yield backend as seen by the keeper.
pub trait Strategy: Send + Sync {
    /// The tag this implementation serves.
    fn strategy_type(&self) -> StrategyType;

    /// What the pool's position in `denom` would liquidate for now.
    ///
    /// Returns a zero coin when there is no position.
    fn total_realizable_value(&self, denom: &str) -> Result<Coin, StrategyError>;

    /// Moves `amount` from the pool into the backend.
    fn deposit(&self, amount: &Coin) -> Result<(), StrategyError>;

    /// Moves `amount` from the backend back to the pool.
    fn withdraw(&self, amount: &Coin) -> Result<(), StrategyError>;
}

// ---------------------------------------------------------------------------
// StrategyRegistry
// ---------------------------------------------------------------------------

/// Resolves a [`StrategyType`] to its implementation.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<StrategyType, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `strategy` under its own tag, replacing any previous one.
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) -> &mut Self {
        self.strategies.insert(strategy.strategy_type(), strategy);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.register(strategy);
        self
    }

    /// The implementation registered for `strategy_type`.
    pub fn get(&self, strategy_type: StrategyType) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(&strategy_type).cloned()
    }

    /// Registered tags, sorted.
    pub fn registered(&self) -> Vec<StrategyType> {
        let mut types: Vec<StrategyType> = self.strategies.keys().copied().collect();
        types.sort();
        types
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}
