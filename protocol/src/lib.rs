// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NOVA Earn: Share-Vault Accounting Core
//!
//! Depositors put an asset into a vault and get shares back. The vault's
//! funds sit in a yield backend (a "strategy") and grow or shrink over time.
//! Shares are a proportional claim on whatever the vault is worth when they
//! are redeemed. If you know ERC-4626, you know the shape of this.
//!
//! ## Architecture
//!
//! - **types**: `Dec`, `Coin`, `Address`. The only arithmetic that touches
//!   money.
//! - **vault**: Share records and vault configuration. Plain data.
//! - **storage**: `KvStore` backends (memory, sled) and the typed
//!   `VaultLedger` on top.
//! - **strategy**: Yield backends behind one trait, selected by tag.
//! - **bank**: The asset transfer capability the keeper borrows.
//! - **keeper**: Deposit/withdraw orchestration, conversion, hooks,
//!   queries, invariants.
//! - **genesis**: Whole-state import/export.
//! - **config**: Constants and store key layout.
//!
//! ## Design Philosophy
//!
//! 1. Multiply before dividing, truncate toward the vault. Always.
//! 2. Records are encoded before funds move and written last. A failed
//!    write unwinds the fund movements it followed.
//! 3. Zero never hits storage. Empty records are deleted.
//! 4. Totals always equal the sum of positions, and there is an invariant
//!    that says so.

pub mod bank;
pub mod config;
pub mod genesis;
pub mod keeper;
pub mod storage;
pub mod strategy;
pub mod types;
pub mod vault;

pub use bank::{Bank, BankError};
pub use genesis::{export_genesis, init_genesis, GenesisError, GenesisState};
pub use keeper::{EarnError, EarnEvent, EarnHooks, Keeper};
pub use storage::{EarnDb, KvStore, MemStore, VaultLedger};
pub use strategy::{Strategy, StrategyRegistry, StrategyType};
pub use types::{Address, Coin, Dec};
