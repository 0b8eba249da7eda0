//! Staged notification parser (pending-review path).
//!
//! Same extraction primitives as the scored classifier, but tuned for
//! surfacing uncertain items to a human instead of auto-filing them:
//! - acceptance gate is "any signal present", not "amount required"
//! - id is deterministic over sender + raw text, not just content
//! - confidence is an integer 0-100 (amount 50, merchant 30, direction 20,
//!   floor 10)
//!
//! Kept as a separate strategy from `classify`; their rejection criteria
//! differ deliberately.

use chrono::{DateTime, Local, Utc};

use crate::extract::{detect_direction, extract_amount};
use crate::hash::event_id;
use crate::lexicon::Lexicons;
use crate::party::{detect_party, extract_account_mask};
use crate::sanitize::{is_suspicious, normalize, sanitize};
use crate::types::{Direction, ParsedTransaction};

const CONFIDENCE_AMOUNT: u32 = 50;
const CONFIDENCE_MERCHANT: u32 = 30;
const CONFIDENCE_DIRECTION: u32 = 20;
const CONFIDENCE_FLOOR: u32 = 10;
const CONFIDENCE_CEILING: u32 = 100;

/// Parse a raw notification into a staged transaction.
///
/// Returns `None` when the text sanitizes to nothing, is blacklisted, or
/// yields no signal at all (no amount, no merchant, unknown direction).
pub fn parse_notification(
    lex: &Lexicons,
    raw: &str,
    sender: Option<&str>,
    timestamp_ms: i64,
) -> Option<ParsedTransaction> {
    let sanitized = sanitize(lex, raw);
    if sanitized.is_empty() {
        return None;
    }
    let text = normalize(&sanitized);
    if is_suspicious(lex, &text) {
        return None;
    }

    let amount = extract_amount(lex, &text);
    let merchant = detect_party(lex, &text);
    let account_mask = extract_account_mask(lex, &text);
    let direction = detect_direction(lex, &text, amount);

    // Any-signal gate: an entry with nothing extracted would only be noise
    // in the review queue.
    if amount.is_none() && merchant.is_none() && !direction.is_known() {
        return None;
    }

    let confidence = confidence_score(amount, merchant.as_deref(), direction);

    Some(ParsedTransaction {
        id: event_id(sender, raw),
        raw: raw.to_string(),
        sender: sender.map(str::to_string),
        amount,
        currency: amount.map(|_| "INR".to_string()),
        direction,
        merchant,
        account_mask,
        timestamp: format_timestamp(timestamp_ms),
        created_at_ms: timestamp_ms,
        confidence,
    })
}

fn confidence_score(amount: Option<f64>, merchant: Option<&str>, direction: Direction) -> u8 {
    let mut score = 0;
    if amount.is_some() {
        score += CONFIDENCE_AMOUNT;
    }
    if merchant.is_some() {
        score += CONFIDENCE_MERCHANT;
    }
    if direction.is_known() {
        score += CONFIDENCE_DIRECTION;
    }
    score.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING) as u8
}

fn format_timestamp(timestamp_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%d %b %Y, %I:%M %p")
            .to_string(),
        None => String::new(),
    }
}
