//! # Vault Ledger
//!
//! Typed access to the earn records over any [`KvStore`]. This is the only
//! code that knows the key layout.
//!
//! ## Key Encoding
//!
//! ```text
//! 0x00                          → Params
//! 0x01 ‖ denom                  → VaultRecord
//! 0x02 ‖ len(addr) ‖ addr       → VaultShareRecord
//! ```
//!
//! The address length byte makes share keys prefix-free, so iteration order
//! is (length, bytes), which matches `Ord for Address`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::kv::{KvStore, MemStore, StoreError, StoreResult, WriteBatch};
use crate::config::{PARAMS_KEY, VAULT_RECORD_PREFIX, VAULT_SHARE_RECORD_PREFIX};
use crate::types::Address;
use crate::vault::{Params, VaultRecord, VaultShareRecord};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Store key for the vault record of `denom`.
pub fn vault_record_key(denom: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + denom.len());
    key.push(VAULT_RECORD_PREFIX);
    key.extend_from_slice(denom.as_bytes());
    key
}

/// Store key for the share record of `depositor`.
pub fn vault_share_record_key(depositor: &Address) -> Vec<u8> {
    let bytes = depositor.as_bytes();
    let mut key = Vec::with_capacity(2 + bytes.len());
    key.push(VAULT_SHARE_RECORD_PREFIX);
    // Address construction caps the length at 255.
    key.push(bytes.len() as u8);
    key.extend_from_slice(bytes);
    key
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corrupt {
        key: hex::encode(key),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// VaultLedger
// ---------------------------------------------------------------------------

/// Typed reads and writes of params, vault records and share records.
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Clone)]
pub struct VaultLedger {
    store: Arc<dyn KvStore>,
}

impl VaultLedger {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// A ledger over a fresh [`MemStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemStore::new()))
    }

    // -- Params -------------------------------------------------------------

    /// Stored params, or the empty default if none were ever set.
    pub fn get_params(&self) -> StoreResult<Params> {
        match self.store.get(PARAMS_KEY)? {
            Some(bytes) => decode(PARAMS_KEY, &bytes),
            None => Ok(Params::default()),
        }
    }

    pub fn set_params(&self, params: &Params) -> StoreResult<()> {
        self.store.set(PARAMS_KEY, &encode(params)?)
    }

    // -- Vault records ------------------------------------------------------

    pub fn get_vault_record(&self, denom: &str) -> StoreResult<Option<VaultRecord>> {
        let key = vault_record_key(denom);
        self.store
            .get(&key)?
            .map(|bytes| decode(&key, &bytes))
            .transpose()
    }

    /// Stores `record`, or deletes it if its total is zero.
    pub fn set_vault_record(&self, record: &VaultRecord) -> StoreResult<()> {
        let mut batch = WriteBatch::default();
        stage_vault_record(&mut batch, record)?;
        self.store.write_batch(batch)
    }

    pub fn delete_vault_record(&self, denom: &str) -> StoreResult<()> {
        self.store.delete(&vault_record_key(denom))
    }

    /// All vault records in ascending denom order.
    pub fn iterate_vault_records(&self) -> StoreResult<Vec<VaultRecord>> {
        self.store
            .scan_prefix(&[VAULT_RECORD_PREFIX])?
            .into_iter()
            .map(|(k, v)| decode(&k, &v))
            .collect()
    }

    // -- Share records ------------------------------------------------------

    pub fn get_vault_share_record(
        &self,
        depositor: &Address,
    ) -> StoreResult<Option<VaultShareRecord>> {
        let key = vault_share_record_key(depositor);
        self.store
            .get(&key)?
            .map(|bytes| decode(&key, &bytes))
            .transpose()
    }

    /// Stores `record`, or deletes it if it holds no shares.
    pub fn set_vault_share_record(&self, record: &VaultShareRecord) -> StoreResult<()> {
        let mut batch = WriteBatch::default();
        stage_share_record(&mut batch, record)?;
        self.store.write_batch(batch)
    }

    pub fn delete_vault_share_record(&self, depositor: &Address) -> StoreResult<()> {
        self.store.delete(&vault_share_record_key(depositor))
    }

    /// All share records in ascending key order.
    pub fn iterate_vault_share_records(&self) -> StoreResult<Vec<VaultShareRecord>> {
        self.store
            .scan_prefix(&[VAULT_SHARE_RECORD_PREFIX])?
            .into_iter()
            .map(|(k, v)| {
                let record: VaultShareRecord = decode(&k, &v)?;
                if k != vault_share_record_key(&record.depositor) {
                    return Err(StoreError::Corrupt {
                        key: hex::encode(&k),
                        reason: format!("record belongs to {}", record.depositor),
                    });
                }
                Ok(record)
            })
            .collect()
    }

    // -- Combined writes ----------------------------------------------------

    /// Encodes one vault record and one share record into a batch without
    /// writing anything. Zero or empty records become deletes.
    pub fn stage_position(
        vault_record: &VaultRecord,
        share_record: &VaultShareRecord,
    ) -> StoreResult<WriteBatch> {
        let mut batch = WriteBatch::default();
        stage_vault_record(&mut batch, vault_record)?;
        stage_share_record(&mut batch, share_record)?;
        Ok(batch)
    }

    /// Applies a staged batch atomically.
    pub fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        self.store.write_batch(batch)
    }

    /// Writes params and every record in one atomic batch.
    pub fn import(
        &self,
        params: &Params,
        vault_records: &[VaultRecord],
        share_records: &[VaultShareRecord],
    ) -> StoreResult<()> {
        let mut batch = WriteBatch::default();
        batch.put(PARAMS_KEY.to_vec(), encode(params)?);
        for record in vault_records {
            stage_vault_record(&mut batch, record)?;
        }
        for record in share_records {
            stage_share_record(&mut batch, record)?;
        }
        self.store.write_batch(batch)
    }
}

impl std::fmt::Debug for VaultLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultLedger").finish_non_exhaustive()
    }
}

fn stage_vault_record(batch: &mut WriteBatch, record: &VaultRecord) -> StoreResult<()> {
    let key = vault_record_key(record.denom());
    if record.total().is_zero() {
        batch.delete(key);
    } else {
        batch.put(key, encode(record)?);
    }
    Ok(())
}

fn stage_share_record(batch: &mut WriteBatch, record: &VaultShareRecord) -> StoreResult<()> {
    let key = vault_share_record_key(&record.depositor);
    if record.shares.is_empty() {
        batch.delete(key);
    } else {
        batch.put(key, encode(record)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
