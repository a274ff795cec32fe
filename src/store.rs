// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 TxRelay Contributors

//! TTL-capable transaction store.
//!
//! Holds the canonical mutable record for every in-flight or recently
//! resolved transaction. Record volume is bounded by in-flight transactions,
//! not history, so the status scan is a plain full-keyspace walk.
//!
//! All keys share the `tx:` namespace prefix. Entries may carry an expiry;
//! expired entries are dropped lazily on access and during scans. Updates
//! merge a [`TransactionPatch`] into the stored record, bump `updated_at` and
//! `version`, and reject status writes that would move backwards through the
//! state machine.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::{TransactionPatch, TransactionRecord, TransactionStatus};

/// Expiry applied to records that are about to be cleaned up (failed sends,
/// terminal reads).
pub const SHORT_TTL: Duration = Duration::from_secs(5 * 60);

const KEY_PREFIX: &str = "tx:";

/// Store failure. In-process storage can only fail on a poisoned lock, but
/// callers treat it like any other storage backend error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

struct Entry {
    record: TransactionRecord,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Mutexed in-memory transaction store.
#[derive(Default)]
pub struct TransactionStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    /// Insert or replace the record for an id, with no expiry.
    pub fn put(&self, record: TransactionRecord) -> StoreResult<()> {
        let mut entries = self.lock()?;
        entries.insert(
            Self::key(&record.id),
            Entry {
                record,
                expires_at: None,
            },
        );
        Ok(())
    }

    /// Fetch a record by id. Expired entries read as absent.
    pub fn get(&self, id: &str) -> StoreResult<Option<TransactionRecord>> {
        let mut entries = self.lock()?;
        let key = Self::key(id);
        let now = Instant::now();
        match entries.get(&key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(&key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.record.clone())),
            None => Ok(None),
        }
    }

    /// Merge a patch into the stored record.
    ///
    /// Bumps `updated_at` and `version`. A status change that the state
    /// machine forbids is ignored field-wise (the rest of the patch still
    /// applies), so a late or duplicate writer cannot resurrect a terminal
    /// record. With `short_ttl` the entry expires after [`SHORT_TTL`].
    ///
    /// Returns the updated record, or `None` if the id is absent.
    pub fn update(
        &self,
        id: &str,
        patch: TransactionPatch,
        short_ttl: bool,
    ) -> StoreResult<Option<TransactionRecord>> {
        let mut entries = self.lock()?;
        let key = Self::key(id);
        let now = Instant::now();

        let Some(entry) = entries.get_mut(&key) else {
            return Ok(None);
        };
        if entry.is_expired(now) {
            entries.remove(&key);
            return Ok(None);
        }

        let record = &mut entry.record;
        if let Some(status) = patch.status {
            if record.status.can_transition_to(status) {
                record.status = status;
            } else if record.status != status {
                tracing::warn!(
                    id = %record.id,
                    from = ?record.status,
                    to = ?status,
                    "Rejected backwards status transition"
                );
            }
        }
        if let Some(hash) = patch.hash {
            // Hash is write-once.
            if record.hash.is_none() {
                record.hash = Some(hash);
            }
        }
        if let Some(code) = patch.code {
            record.code = code.code();
            record.message = code.message().to_string();
        }
        if let Some(gas_used) = patch.gas_used {
            record.gas_used = Some(gas_used);
        }
        if let Some(gas_price) = patch.gas_price {
            record.gas_price = Some(gas_price);
        }
        if let Some(chain_id) = patch.chain_id {
            record.chain_id = Some(chain_id);
        }
        if let Some(data) = patch.data {
            record.data = Some(data);
        }
        record.updated_at = chrono::Utc::now();
        record.version += 1;

        if short_ttl {
            entry.expires_at = Some(now + SHORT_TTL);
        }

        Ok(Some(entry.record.clone()))
    }

    /// Full-keyspace scan filtered by status.
    pub fn scan_by_status(&self, status: TransactionStatus) -> StoreResult<Vec<TransactionRecord>> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        entries.retain(|_, entry| !entry.is_expired(now));

        let mut records: Vec<TransactionRecord> = entries
            .values()
            .filter(|entry| entry.record.status == status)
            .map(|entry| entry.record.clone())
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    /// Remove a record by id. Returns whether it existed.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        match entries.remove(&Self::key(id)) {
            Some(entry) => Ok(!entry.is_expired(now)),
            None => Ok(false),
        }
    }

    /// Remove every record currently in the given status. Returns the count.
    pub fn delete_by_status(&self, status: TransactionStatus) -> StoreResult<usize> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now) && entry.record.status != status);
        Ok(before.saturating_sub(entries.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::ResultCode;
    use crate::models::{Credential, NetworkId, SubmitRequest};

    fn sample_request() -> SubmitRequest {
        SubmitRequest {
            network: NetworkId::Polygon,
            from: "0x1111111111111111111111111111111111111111".into(),
            to: "0x2222222222222222222222222222222222222222".into(),
            amount: "10".into(),
            token: None,
            gas: None,
            private_key: Credential::new("k"),
        }
    }

    fn sample_record(id: &str) -> TransactionRecord {
        TransactionRecord::new_pending(id.to_string(), &sample_request())
    }

    #[test]
    fn put_get_round_trip() {
        let store = TransactionStore::new();
        store.put(sample_record("a")).unwrap();

        let record = store.get("a").unwrap().unwrap();
        assert_eq!(record.id, "a");
        assert_eq!(record.status, TransactionStatus::PendingQueue);
        assert_eq!(record.version, 0);

        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn update_merges_and_bumps_version() {
        let store = TransactionStore::new();
        store.put(sample_record("a")).unwrap();

        let updated = store
            .update(
                "a",
                TransactionPatch::status(TransactionStatus::PendingConfirmation)
                    .with_hash("0xabc")
                    .with_code(ResultCode::Success),
                false,
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, TransactionStatus::PendingConfirmation);
        assert_eq!(updated.hash.as_deref(), Some("0xabc"));
        assert_eq!(updated.version, 1);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn update_missing_id_is_absent() {
        let store = TransactionStore::new();
        let result = store
            .update(
                "nope",
                TransactionPatch::status(TransactionStatus::Confirmed),
                false,
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn backwards_transition_is_rejected() {
        let store = TransactionStore::new();
        store.put(sample_record("a")).unwrap();
        store
            .update(
                "a",
                TransactionPatch::status(TransactionStatus::Confirmed),
                false,
            )
            .unwrap();

        let after = store
            .update(
                "a",
                TransactionPatch::status(TransactionStatus::PendingQueue),
                false,
            )
            .unwrap()
            .unwrap();
        assert_eq!(after.status, TransactionStatus::Confirmed);

        let after = store
            .update(
                "a",
                TransactionPatch::status(TransactionStatus::Failed),
                false,
            )
            .unwrap()
            .unwrap();
        assert_eq!(after.status, TransactionStatus::Confirmed);
    }

    #[test]
    fn hash_is_write_once() {
        let store = TransactionStore::new();
        store.put(sample_record("a")).unwrap();
        store
            .update("a", TransactionPatch::default().with_hash("0xfirst"), false)
            .unwrap();
        let record = store
            .update(
                "a",
                TransactionPatch::default().with_hash("0xsecond"),
                false,
            )
            .unwrap()
            .unwrap();
        assert_eq!(record.hash.as_deref(), Some("0xfirst"));
    }

    #[test]
    fn scan_by_status_filters() {
        let store = TransactionStore::new();
        store.put(sample_record("a")).unwrap();
        store.put(sample_record("b")).unwrap();
        store.put(sample_record("c")).unwrap();
        store
            .update(
                "b",
                TransactionPatch::status(TransactionStatus::Confirmed),
                false,
            )
            .unwrap();

        let pending = store
            .scan_by_status(TransactionStatus::PendingQueue)
            .unwrap();
        assert_eq!(pending.len(), 2);
        let confirmed = store.scan_by_status(TransactionStatus::Confirmed).unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id, "b");
    }

    #[test]
    fn delete_by_id_and_status() {
        let store = TransactionStore::new();
        store.put(sample_record("a")).unwrap();
        store.put(sample_record("b")).unwrap();

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert!(store.get("a").unwrap().is_none());

        assert_eq!(
            store
                .delete_by_status(TransactionStatus::PendingQueue)
                .unwrap(),
            1
        );
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn short_ttl_entries_expire() {
        let store = TransactionStore::new();
        store.put(sample_record("a")).unwrap();
        store
            .update(
                "a",
                TransactionPatch::status(TransactionStatus::Failed),
                true,
            )
            .unwrap();

        // Force the expiry into the past instead of sleeping.
        {
            let mut entries = store.entries.lock().unwrap();
            let entry = entries.get_mut("tx:a").unwrap();
            entry.expires_at = Some(Instant::now() - Duration::from_secs(1));
        }

        assert!(store.get("a").unwrap().is_none());
        assert!(store
            .scan_by_status(TransactionStatus::Failed)
            .unwrap()
            .is_empty());
    }
}
