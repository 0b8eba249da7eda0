//! Redelivery suppression.
//!
//! Android redelivers identical notifications (sticky notifications,
//! listener reconnects) within seconds. A small persisted set of
//! `{id, created_at}` records recognizes those within a short retention
//! window. Independent of the pending buffer's own dedup by id; the window
//! bounds redelivery recognition, not the pending entry's lifetime.

use anyhow::Result;
use paisa_core::{DEDUPE_KEY, KvStore};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How long a seen id is remembered (ms).
pub const DEDUP_TTL_MS: i64 = 90_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupRecord {
    pub id: String,
    pub created_at: i64,
}

/// Persisted, TTL-bounded set of recently seen event ids.
/// Expired records are pruned lazily at access, not by a timer.
#[derive(Debug, Clone, Default)]
pub struct DedupStore {
    records: Vec<DedupRecord>,
}

impl DedupStore {
    /// Load from storage; missing or corrupt blob loads as empty.
    pub fn load(store: &dyn KvStore) -> Self {
        let raw = match store.get(DEDUPE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(key = DEDUPE_KEY, %err, "dedup set unreadable, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<DedupRecord>>(&raw) {
            Ok(records) => Self { records },
            Err(err) => {
                warn!(key = DEDUPE_KEY, %err, "dedup set corrupt, starting empty");
                Self::default()
            }
        }
    }

    /// Whether `id` was seen within the retention window. Prunes expired
    /// records as a side effect (in memory only; persisted on next record).
    pub fn is_duplicate(&mut self, id: &str, now_ms: i64) -> bool {
        self.prune(now_ms);
        self.records.iter().any(|r| r.id == id)
    }

    /// Remember `id` and persist the pruned set.
    pub fn record(&mut self, store: &mut dyn KvStore, id: &str, now_ms: i64) -> Result<()> {
        self.prune(now_ms);
        if !self.records.iter().any(|r| r.id == id) {
            self.records.push(DedupRecord {
                id: id.to_string(),
                created_at: now_ms,
            });
        }
        store.set(DEDUPE_KEY, &serde_json::to_string(&self.records)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn prune(&mut self, now_ms: i64) {
        self.records
            .retain(|r| now_ms.saturating_sub(r.created_at) <= DEDUP_TTL_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paisa_core::MemoryStore;

    const T0: i64 = 1_767_257_400_000;

    #[test]
    fn test_duplicate_within_window() {
        let mut kv = MemoryStore::new();
        let mut dedup = DedupStore::default();

        assert!(!dedup.is_duplicate("txn_a", T0));
        dedup.record(&mut kv, "txn_a", T0).unwrap();
        assert!(dedup.is_duplicate("txn_a", T0 + 1_000));
        assert!(!dedup.is_duplicate("txn_b", T0 + 1_000));
    }

    #[test]
    fn test_expires_after_ttl() {
        let mut kv = MemoryStore::new();
        let mut dedup = DedupStore::default();
        dedup.record(&mut kv, "txn_a", T0).unwrap();

        assert!(dedup.is_duplicate("txn_a", T0 + DEDUP_TTL_MS));
        assert!(!dedup.is_duplicate("txn_a", T0 + DEDUP_TTL_MS + 1));
        assert!(dedup.is_empty());
    }

    #[test]
    fn test_persists_and_reloads() {
        let mut kv = MemoryStore::new();
        let mut dedup = DedupStore::default();
        dedup.record(&mut kv, "txn_a", T0).unwrap();

        let mut reloaded = DedupStore::load(&kv);
        assert!(reloaded.is_duplicate("txn_a", T0 + 1));
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let mut kv = MemoryStore::new();
        kv.set(DEDUPE_KEY, "[oops").unwrap();
        assert!(DedupStore::load(&kv).is_empty());
    }
}
