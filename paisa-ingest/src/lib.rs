//! paisa-ingest: the staging layer between listener bridges and the ledger.
//!
//! Raw `(text, sender, timestamp)` events come in; deduplicated ledger
//! entries or pending-review items come out.

pub mod dedup;
pub mod pending;
pub mod pipeline;
pub mod types;

pub use dedup::{DEDUP_TTL_MS, DedupRecord, DedupStore};
pub use pending::{MAX_PENDING, PENDING_TTL_MS, PendingBuffer, PendingEntry, VISIBLE_LIMIT};
pub use pipeline::{DirectLedgerPipeline, DropReason, IngestOutcome, StagedReviewPipeline};
pub use types::{EventSource, LedgerEntry, RawEvent};
