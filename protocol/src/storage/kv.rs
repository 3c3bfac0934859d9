//! # Keyed Storage Abstraction
//!
//! The earn ledger only needs a byte-keyed map with ordered prefix scans and
//! atomic multi-key writes. [`KvStore`] is that contract; [`MemStore`] is
//! the in-memory implementation used by tests and simulations, and
//! [`EarnDb`](super::EarnDb) is the sled-backed one.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored key or value does not decode to what its prefix promises.
    #[error("corrupt entry under key {key}: {reason}")]
    Corrupt {
        /// Hex-encoded key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Write batches
// ---------------------------------------------------------------------------

/// A single pending write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Writes applied together by [`KvStore::write_batch`]: all land or none do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Put(key.into(), value.into()));
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Delete(key.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

// ---------------------------------------------------------------------------
// KvStore
// ---------------------------------------------------------------------------

/// Byte-keyed storage with ascending-order prefix iteration.
pub trait KvStore: Send + Sync {
    /// Reads one key.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Writes one key.
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Removes one key. Removing an absent key is not an error.
    fn delete(&self, key: &[u8]) -> StoreResult<()>;

    /// Every entry whose key starts with `prefix`, in ascending key order.
    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Applies every op in `batch` atomically.
    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// MemStore
// ---------------------------------------------------------------------------

/// In-memory [`KvStore`] over a `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .entries
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut entries = self.entries.write();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put(k, v) => {
                    entries.insert(k, v);
                }
                WriteOp::Delete(k) => {
                    entries.remove(&k);
                }
            }
        }
        Ok(())
    }
}
