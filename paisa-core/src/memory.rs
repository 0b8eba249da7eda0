//! Correction memory: party -> category associations taught by the user.
//!
//! Consulted read-only by the classifier; mutated only when the user edits
//! a suggested category before accepting it. Bounded to the most recent
//! `MEMORY_LIMIT` entries by insertion order (keep-tail-N, not LRU: an
//! updated entry keeps its original position, matching how the persisted
//! map evolved in production).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lexicon::{MEMORY_KEY, MEMORY_LIMIT};
use crate::storage::KvStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MemoryEntry {
    party: String,
    category: String,
}

/// Persistent, bounded party-name -> category map.
#[derive(Debug, Clone, Default)]
pub struct CorrectionStore {
    entries: Vec<MemoryEntry>,
}

impl CorrectionStore {
    /// Load from storage. A missing or corrupt blob loads as empty.
    pub fn load(store: &dyn KvStore) -> Self {
        let raw = match store.get(MEMORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(key = MEMORY_KEY, %err, "correction memory unreadable, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<MemoryEntry>>(&raw) {
            Ok(entries) => Self { entries },
            Err(err) => {
                warn!(key = MEMORY_KEY, %err, "correction memory corrupt, starting empty");
                Self::default()
            }
        }
    }

    /// Record a user correction and persist. Party names are keyed
    /// lowercase; an existing entry is updated in place, a new one appended
    /// to the tail, and the head dropped once over the cap.
    pub fn record(&mut self, store: &mut dyn KvStore, party: &str, category: &str) -> Result<()> {
        let party = party.trim().to_lowercase();
        if party.is_empty() {
            return Ok(());
        }

        match self.entries.iter_mut().find(|e| e.party == party) {
            Some(entry) => entry.category = category.to_string(),
            None => self.entries.push(MemoryEntry {
                party,
                category: category.to_string(),
            }),
        }

        if self.entries.len() > MEMORY_LIMIT {
            let overflow = self.entries.len() - MEMORY_LIMIT;
            self.entries.drain(..overflow);
        }

        self.save(store)
    }

    /// Learned category for a party, if any.
    pub fn lookup(&self, party: &str) -> Option<&str> {
        let party = party.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.party == party)
            .map(|e| e.category.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.party.as_str(), e.category.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self, store: &mut dyn KvStore) -> Result<()> {
        self.entries.clear();
        store.remove(MEMORY_KEY)
    }

    fn save(&self, store: &mut dyn KvStore) -> Result<()> {
        store.set(MEMORY_KEY, &serde_json::to_string(&self.entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_record_and_lookup_is_case_insensitive() {
        let mut kv = MemoryStore::new();
        let mut mem = CorrectionStore::default();
        mem.record(&mut kv, "Swiggy", "Food & Drinks").unwrap();

        assert_eq!(mem.lookup("swiggy"), Some("Food & Drinks"));
        assert_eq!(mem.lookup("SWIGGY"), Some("Food & Drinks"));
        assert_eq!(mem.lookup("zomato"), None);
    }

    #[test]
    fn test_persists_and_reloads() {
        let mut kv = MemoryStore::new();
        let mut mem = CorrectionStore::default();
        mem.record(&mut kv, "swiggy", "Food & Drinks").unwrap();

        let reloaded = CorrectionStore::load(&kv);
        assert_eq!(reloaded.lookup("swiggy"), Some("Food & Drinks"));
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let mut kv = MemoryStore::new();
        kv.set(MEMORY_KEY, "{not json").unwrap();
        let mem = CorrectionStore::load(&kv);
        assert!(mem.is_empty());
    }

    #[test]
    fn test_eviction_keeps_tail_n() {
        let mut kv = MemoryStore::new();
        let mut mem = CorrectionStore::default();
        for i in 0..(MEMORY_LIMIT + 5) {
            mem.record(&mut kv, &format!("party{i}"), "Expense").unwrap();
        }

        assert_eq!(mem.len(), MEMORY_LIMIT);
        // Oldest dropped, newest kept.
        assert_eq!(mem.lookup("party0"), None);
        assert_eq!(mem.lookup("party4"), None);
        assert_eq!(mem.lookup("party5"), Some("Expense"));
        assert_eq!(mem.lookup(&format!("party{}", MEMORY_LIMIT + 4)), Some("Expense"));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut kv = MemoryStore::new();
        let mut mem = CorrectionStore::default();
        mem.record(&mut kv, "a", "One").unwrap();
        mem.record(&mut kv, "b", "Two").unwrap();
        mem.record(&mut kv, "a", "Three").unwrap();

        let order: Vec<_> = mem.entries().map(|(p, _)| p.to_string()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(mem.lookup("a"), Some("Three"));
    }

    #[test]
    fn test_clear_removes_key() {
        let mut kv = MemoryStore::new();
        let mut mem = CorrectionStore::default();
        mem.record(&mut kv, "swiggy", "Food & Drinks").unwrap();
        mem.clear(&mut kv).unwrap();

        assert!(mem.is_empty());
        assert_eq!(kv.get(MEMORY_KEY).unwrap(), None);
    }
}
