//! paisa-core: transaction-text classification for bank/UPI notifications.
//!
//! Heuristic, best-effort extraction of structured transactions from short
//! Indian bank/UPI texts: lexicon tables, stateless field extractors, a
//! scored classifier, a staged notification parser, and the persistent
//! correction memory that learns user edits.

pub mod classify;
pub mod extract;
pub mod hash;
pub mod lexicon;
pub mod memory;
pub mod parser;
pub mod party;
pub mod sanitize;
pub mod storage;
pub mod types;

pub use classify::{Classifier, DIRECTION_TIE_BREAK, Signals, score_signals};
pub use extract::{detect_direction, extract_amount};
pub use hash::{event_id, fingerprint};
pub use lexicon::{
    AMOUNT_CEILING, DEDUPE_KEY, Lexicons, MEMORY_KEY, MEMORY_LIMIT, PENDING_KEY,
    is_sender_whitelisted,
};
pub use memory::CorrectionStore;
pub use parser::parse_notification;
pub use party::{detect_party, extract_account_mask, extract_upi_id, parse_party_preposition};
pub use sanitize::{is_suspicious, normalize, sanitize};
pub use storage::{KvStore, MemoryStore};
pub use types::{Classification, Direction, ParsedTransaction};
