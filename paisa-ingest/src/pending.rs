//! Pending review buffer: detected-but-unconfirmed transactions awaiting
//! user accept/ignore.
//!
//! Entry lifecycle: Pending -> {resolved, expired, evicted}, all terminal.
//! Newest entries sit at the head (display order). Expiry and capacity
//! eviction happen lazily on access; `resolve` is the sole removal path
//! driven by the UI.

use anyhow::Result;
use paisa_core::{KvStore, PENDING_KEY, ParsedTransaction};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hard cap on queued entries; oldest are evicted beyond this.
pub const MAX_PENDING: usize = 100;

/// Only this many entries are surfaced to the review UI at once; the rest
/// stay queued.
pub const VISIBLE_LIMIT: usize = 10;

/// Unresolved entries older than this are dropped at next access.
pub const PENDING_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// A staged transaction plus buffer-management metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEntry {
    pub txn: ParsedTransaction,
    /// When the entry entered the buffer (epoch ms); drives TTL expiry.
    pub inserted_at_ms: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PendingBuffer {
    /// Newest first.
    entries: Vec<PendingEntry>,
}

impl PendingBuffer {
    /// Load from storage; missing or corrupt blob loads as empty.
    pub fn load(store: &dyn KvStore) -> Self {
        let raw = match store.get(PENDING_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(key = PENDING_KEY, %err, "pending queue unreadable, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<PendingEntry>>(&raw) {
            Ok(entries) => Self { entries },
            Err(err) => {
                warn!(key = PENDING_KEY, %err, "pending queue corrupt, starting empty");
                Self::default()
            }
        }
    }

    /// Queue a parsed transaction. Returns false (and leaves the buffer
    /// untouched) when an entry with the same id already exists. Evicts
    /// expired entries first and the oldest entry beyond `MAX_PENDING`.
    pub fn push(
        &mut self,
        store: &mut dyn KvStore,
        txn: ParsedTransaction,
        now_ms: i64,
    ) -> Result<bool> {
        self.expire(now_ms);

        if self.entries.iter().any(|e| e.txn.id == txn.id) {
            return Ok(false);
        }

        self.entries.insert(
            0,
            PendingEntry {
                txn,
                inserted_at_ms: now_ms,
            },
        );
        if self.entries.len() > MAX_PENDING {
            self.entries.truncate(MAX_PENDING);
        }

        self.save(store)?;
        Ok(true)
    }

    /// Remove an entry by id, regardless of accept/ignore outcome.
    pub fn resolve(&mut self, store: &mut dyn KvStore, id: &str) -> Result<Option<ParsedTransaction>> {
        let Some(pos) = self.entries.iter().position(|e| e.txn.id == id) else {
            return Ok(None);
        };
        let entry = self.entries.remove(pos);
        self.save(store)?;
        Ok(Some(entry.txn))
    }

    /// The slice surfaced to the review UI: at most `VISIBLE_LIMIT` of the
    /// newest unexpired entries.
    pub fn visible(&mut self, now_ms: i64) -> &[PendingEntry] {
        self.expire(now_ms);
        &self.entries[..self.entries.len().min(VISIBLE_LIMIT)]
    }

    pub fn get(&self, id: &str) -> Option<&ParsedTransaction> {
        self.entries.iter().find(|e| e.txn.id == id).map(|e| &e.txn)
    }

    /// Total queued entries, including those beyond the display cap.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries and persist if anything changed.
    pub fn prune(&mut self, store: &mut dyn KvStore, now_ms: i64) -> Result<usize> {
        let before = self.entries.len();
        self.expire(now_ms);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            self.save(store)?;
        }
        Ok(dropped)
    }

    fn expire(&mut self, now_ms: i64) {
        self.entries
            .retain(|e| now_ms.saturating_sub(e.inserted_at_ms) <= PENDING_TTL_MS);
    }

    fn save(&self, store: &mut dyn KvStore) -> Result<()> {
        store.set(PENDING_KEY, &serde_json::to_string(&self.entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paisa_core::{Direction, MemoryStore};

    const T0: i64 = 1_767_257_400_000;

    fn txn(id: &str) -> ParsedTransaction {
        ParsedTransaction {
            id: id.to_string(),
            raw: format!("raw {id}"),
            sender: None,
            amount: Some(100.0),
            currency: Some("INR".to_string()),
            direction: Direction::Debit,
            merchant: None,
            account_mask: None,
            timestamp: "01 Jan 2026, 09:00 AM".to_string(),
            created_at_ms: T0,
            confidence: 70,
        }
    }

    #[test]
    fn test_push_rejects_duplicate_id() {
        let mut kv = MemoryStore::new();
        let mut buf = PendingBuffer::default();

        assert!(buf.push(&mut kv, txn("a"), T0).unwrap());
        assert!(!buf.push(&mut kv, txn("a"), T0 + 1).unwrap());
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut kv = MemoryStore::new();
        let mut buf = PendingBuffer::default();
        buf.push(&mut kv, txn("old"), T0).unwrap();
        buf.push(&mut kv, txn("new"), T0 + 1_000).unwrap();

        let visible = buf.visible(T0 + 2_000);
        assert_eq!(visible[0].txn.id, "new");
        assert_eq!(visible[1].txn.id, "old");
    }

    #[test]
    fn test_visible_caps_but_keeps_queue() {
        let mut kv = MemoryStore::new();
        let mut buf = PendingBuffer::default();
        for i in 0..(VISIBLE_LIMIT + 3) {
            buf.push(&mut kv, txn(&format!("t{i}")), T0 + i as i64).unwrap();
        }

        assert_eq!(buf.visible(T0 + 1_000).len(), VISIBLE_LIMIT);
        assert_eq!(buf.len(), VISIBLE_LIMIT + 3);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut kv = MemoryStore::new();
        let mut buf = PendingBuffer::default();
        for i in 0..(MAX_PENDING + 2) {
            buf.push(&mut kv, txn(&format!("t{i}")), T0 + i as i64).unwrap();
        }

        assert_eq!(buf.len(), MAX_PENDING);
        assert!(buf.get("t0").is_none());
        assert!(buf.get("t1").is_none());
        assert!(buf.get(&format!("t{}", MAX_PENDING + 1)).is_some());
    }

    #[test]
    fn test_resolve_removes_and_returns() {
        let mut kv = MemoryStore::new();
        let mut buf = PendingBuffer::default();
        buf.push(&mut kv, txn("a"), T0).unwrap();

        let resolved = buf.resolve(&mut kv, "a").unwrap().unwrap();
        assert_eq!(resolved.id, "a");
        assert!(buf.is_empty());
        assert!(buf.resolve(&mut kv, "a").unwrap().is_none());
    }

    #[test]
    fn test_ttl_expiry_is_lazy() {
        let mut kv = MemoryStore::new();
        let mut buf = PendingBuffer::default();
        buf.push(&mut kv, txn("a"), T0).unwrap();

        assert_eq!(buf.visible(T0 + PENDING_TTL_MS).len(), 1);
        assert_eq!(buf.visible(T0 + PENDING_TTL_MS + 1).len(), 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_persists_and_reloads() {
        let mut kv = MemoryStore::new();
        let mut buf = PendingBuffer::default();
        buf.push(&mut kv, txn("a"), T0).unwrap();

        let reloaded = PendingBuffer::load(&kv);
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get("a").is_some());
    }
}
