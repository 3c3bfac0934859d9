//! # EarnDb: Persistent Storage Engine
//!
//! sled-backed [`KvStore`] for the earn ledger. All earn state lives in a
//! single named tree so that it can share a sled database with other
//! modules without key collisions.
//!
//! ## Tree Layout
//!
//! | Tree   | Key                          | Value                      |
//! |--------|------------------------------|----------------------------|
//! | `earn` | `0x00`                       | `bincode(Params)`          |
//! | `earn` | `0x01 ‖ denom`               | `bincode(VaultRecord)`     |
//! | `earn` | `0x02 ‖ len(addr) ‖ addr`    | `bincode(VaultShareRecord)`|
//!
//! sled iterates keys lexicographically, which is exactly the ascending
//! order genesis export and the invariant checks rely on.
//!
//! ## Atomicity
//!
//! [`KvStore::write_batch`] maps onto a sled `Batch`: a deposit's vault
//! record and share record land together or not at all.

use std::path::Path;

use sled::{Batch, Db, Tree};

use super::kv::{KvStore, StoreResult, WriteBatch, WriteOp};
use crate::config::EARN_TREE_NAME;

/// Persistent storage engine for the earn module.
///
/// # Thread Safety
///
/// sled trees support lock-free concurrent reads and serialized writes, so
/// `EarnDb` can be shared via `Arc<EarnDb>` without extra locking.
#[derive(Debug, Clone)]
pub struct EarnDb {
    /// The underlying sled database handle.
    db: Db,
    /// All earn records.
    earn: Tree,
}

impl EarnDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> StoreResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let earn = db.open_tree(EARN_TREE_NAME)?;
        Ok(Self { db, earn })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Returns `true` if the earn tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.earn.is_empty()
    }
}

impl KvStore for EarnDb {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.earn.get(key)?.map(|v| v.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.earn.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.earn.remove(key)?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut out = Vec::new();
        for entry in self.earn.scan_prefix(prefix) {
            let (k, v) = entry?;
            out.push((k.to_vec(), v.to_vec()));
        }
        Ok(out)
    }

    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut sled_batch = Batch::default();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put(k, v) => sled_batch.insert(k, v),
                WriteOp::Delete(k) => sled_batch.remove(k),
            }
        }
        self.earn.apply_batch(sled_batch)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
