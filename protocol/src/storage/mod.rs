//! # Storage Module
//!
//! Persistence for the earn ledger.
//!
//! ## Architecture
//!
//! ```text
//! kv.rs       KvStore trait, WriteBatch, in-memory MemStore
//! db.rs       sled-backed EarnDb
//! ledger.rs   VaultLedger: typed records over any KvStore
//! ```
//!
//! ## Design Decisions
//!
//! 1. **One trait, two backends.** The keeper only sees [`VaultLedger`],
//!    which only sees [`KvStore`]. Tests run on [`MemStore`], the node runs
//!    on [`EarnDb`].
//!
//! 2. **Bincode for on-disk serialization.** Compact and deterministic.
//!    JSON is for genesis files and debugging; bincode is for storage.
//!
//! 3. **Zero never hits disk.** The ledger turns a write of an empty record
//!    into a delete.

pub mod db;
pub mod kv;
pub mod ledger;

pub use db::EarnDb;
pub use kv::{KvStore, MemStore, StoreError, StoreResult, WriteBatch, WriteOp};
pub use ledger::{vault_record_key, vault_share_record_key, VaultLedger};
