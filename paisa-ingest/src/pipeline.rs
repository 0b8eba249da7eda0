//! The two ingest strategies wired between the listener bridges and the
//! core classifier.
//!
//! - [`StagedReviewPipeline`]: notification path. Parses with the
//!   any-signal gate and queues results for human review.
//! - [`DirectLedgerPipeline`]: SMS path. Classifies with the
//!   amount-required gate and emits ledger entries straight away.
//!
//! Deliberately separate: their acceptance gates and confidence formulas
//! differ, and merging them would silently change rejection behavior.
//!
//! Failure semantics: a malformed event is dropped and logged, never
//! propagated; the listener keeps processing. Storage write failures are
//! logged and the in-memory state stays authoritative until the next
//! successful flush. Dedup and pending live under separate storage keys
//! with no cross-key transaction; each save stands alone.

use std::collections::HashSet;

use anyhow::Result;
use paisa_core::{
    Classifier, CorrectionStore, KvStore, Lexicons, ParsedTransaction, is_sender_whitelisted,
    parse_notification,
};
use tracing::{debug, warn};

use crate::dedup::DedupStore;
use crate::pending::{PendingBuffer, PendingEntry};
use crate::types::{EventSource, LedgerEntry, RawEvent};

/// What happened to one delivered event.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Staged into the pending review buffer under this id.
    Queued(String),
    /// Classified and emitted for direct ledger insertion.
    Filed(Box<LedgerEntry>),
    Dropped(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    EmptyText,
    SenderNotWhitelisted,
    /// Empty after sanitizing, blacklisted, or nothing extractable.
    NoSignal,
    Duplicate,
}

/// Notification path: parse, dedup, stage for review.
pub struct StagedReviewPipeline<S: KvStore> {
    store: S,
    lexicons: Lexicons,
    dedup: DedupStore,
    buffer: PendingBuffer,
    memory: CorrectionStore,
}

impl<S: KvStore> StagedReviewPipeline<S> {
    /// Build against a storage backend, loading persisted state.
    pub fn new(store: S) -> Result<Self> {
        let dedup = DedupStore::load(&store);
        let buffer = PendingBuffer::load(&store);
        let memory = CorrectionStore::load(&store);
        Ok(Self {
            store,
            lexicons: Lexicons::new()?,
            dedup,
            buffer,
            memory,
        })
    }

    /// Handle one delivered notification. Never fails; malformed or
    /// unwanted events report a drop reason instead.
    pub fn handle(&mut self, event: &RawEvent) -> IngestOutcome {
        if event.text.trim().is_empty() {
            return IngestOutcome::Dropped(DropReason::EmptyText);
        }
        if !is_sender_whitelisted(event.sender.as_deref()) {
            debug!(sender = ?event.sender, "sender not whitelisted, dropping");
            return IngestOutcome::Dropped(DropReason::SenderNotWhitelisted);
        }

        let Some(parsed) = parse_notification(
            &self.lexicons,
            &event.text,
            event.sender.as_deref(),
            event.timestamp_ms,
        ) else {
            return IngestOutcome::Dropped(DropReason::NoSignal);
        };

        let now_ms = event.timestamp_ms;
        if self.dedup.is_duplicate(&parsed.id, now_ms) {
            debug!(id = %parsed.id, "redelivered event suppressed");
            return IngestOutcome::Dropped(DropReason::Duplicate);
        }

        let id = parsed.id.clone();
        match self.buffer.push(&mut self.store, parsed, now_ms) {
            Ok(true) => {}
            Ok(false) => return IngestOutcome::Dropped(DropReason::Duplicate),
            Err(err) => {
                // Entry is queued in memory; persistence catches up later.
                warn!(%err, "pending queue flush failed");
            }
        }
        if let Err(err) = self.dedup.record(&mut self.store, &id, now_ms) {
            warn!(%err, "dedup record flush failed");
        }

        IngestOutcome::Queued(id)
    }

    /// Entries surfaced to the review UI (display-capped).
    pub fn visible(&mut self, now_ms: i64) -> &[PendingEntry] {
        self.buffer.visible(now_ms)
    }

    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Accept a pending entry into the ledger with the reviewed category.
    /// When `learn_correction` is set and a merchant was detected, the
    /// party -> category association is remembered for future texts.
    pub fn accept(
        &mut self,
        id: &str,
        category: &str,
        learn_correction: bool,
    ) -> Result<Option<LedgerEntry>> {
        let Some(txn) = self.buffer.resolve(&mut self.store, id)? else {
            return Ok(None);
        };

        if learn_correction {
            if let Some(merchant) = &txn.merchant {
                self.memory.record(&mut self.store, merchant, category)?;
            }
        }

        Ok(Some(LedgerEntry::from_parsed(&txn, category, EventSource::Notification)))
    }

    /// Discard a pending entry. Same removal path as accept.
    pub fn ignore(&mut self, id: &str) -> Result<Option<ParsedTransaction>> {
        self.buffer.resolve(&mut self.store, id)
    }

    pub fn memory(&self) -> &CorrectionStore {
        &self.memory
    }
}

/// SMS path: classify and emit ledger entries without staging.
pub struct DirectLedgerPipeline<S: KvStore> {
    store: S,
    classifier: Classifier,
    memory: CorrectionStore,
}

impl<S: KvStore> DirectLedgerPipeline<S> {
    pub fn new(store: S) -> Result<Self> {
        let memory = CorrectionStore::load(&store);
        Ok(Self {
            store,
            classifier: Classifier::new(Lexicons::new()?),
            memory,
        })
    }

    /// Handle one delivered SMS. `known_hashes` are content hashes already
    /// present in the ledger; matching events are suppressed.
    pub fn handle(&mut self, event: &RawEvent, known_hashes: &HashSet<String>) -> IngestOutcome {
        if event.text.trim().is_empty() {
            return IngestOutcome::Dropped(DropReason::EmptyText);
        }

        let Some(classification) = self.classifier.classify(&self.memory, &event.text) else {
            return IngestOutcome::Dropped(DropReason::NoSignal);
        };

        if known_hashes.contains(&classification.hash) {
            debug!(hash = %classification.hash, "ledger already holds this text");
            return IngestOutcome::Dropped(DropReason::Duplicate);
        }

        IngestOutcome::Filed(Box::new(LedgerEntry::from_classification(
            &classification,
            event.timestamp_ms,
            EventSource::Sms,
        )))
    }

    /// Record a user correction (party -> category) for future texts.
    pub fn record_correction(&mut self, party: &str, category: &str) -> Result<()> {
        self.memory.record(&mut self.store, party, category)
    }

    pub fn memory(&self) -> &CorrectionStore {
        &self.memory
    }
}
