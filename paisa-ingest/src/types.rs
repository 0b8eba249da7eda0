//! Event and egress payload types for the ingest pipelines.

use chrono::{DateTime, Local, Utc};
use paisa_core::{Classification, Direction, ParsedTransaction};
use serde::{Deserialize, Serialize};

/// Where a raw event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Notification,
    Sms,
}

/// One delivered notification/SMS, as handed over by the listener bridge.
/// Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub text: String,
    pub sender: Option<String>,
    /// Epoch milliseconds of delivery.
    pub timestamp_ms: i64,
}

impl RawEvent {
    pub fn new(text: impl Into<String>, sender: Option<&str>, timestamp_ms: i64) -> Self {
        Self {
            text: text.into(),
            sender: sender.map(str::to_string),
            timestamp_ms,
        }
    }
}

/// Ledger-insertion payload handed to the expense store collaborator.
///
/// Sign convention: credit amounts are negative, debits positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub title: String,
    pub amount: f64,
    /// ISO date, local time.
    pub date: String,
    /// HH:MM, local time.
    pub time: String,
    pub description: String,
    pub merchant: Option<String>,
    pub direction: Direction,
    pub category: String,
    /// 0.0-1.0.
    pub confidence: f64,
    pub tags: Vec<String>,
    pub source: EventSource,
    pub hash: String,
}

impl LedgerEntry {
    /// Build from a scored classification (direct path).
    pub fn from_classification(c: &Classification, timestamp_ms: i64, source: EventSource) -> Self {
        let (date, time) = local_date_time(timestamp_ms);
        Self {
            title: c.party.clone().unwrap_or_else(|| "Unknown".to_string()),
            amount: signed_amount(c.amount, c.direction),
            date,
            time,
            description: c.raw.clone(),
            merchant: c.party.clone(),
            direction: c.direction,
            category: c.category.clone(),
            confidence: c.confidence,
            tags: c.tags.clone(),
            source,
            hash: c.hash.clone(),
        }
    }

    /// Build from an accepted pending entry (staged path). The category is
    /// whatever the user confirmed or edited in review.
    pub fn from_parsed(txn: &ParsedTransaction, category: &str, source: EventSource) -> Self {
        let (date, time) = local_date_time(txn.created_at_ms);
        Self {
            title: txn.merchant.clone().unwrap_or_else(|| "Unknown".to_string()),
            amount: signed_amount(txn.amount.unwrap_or(0.0), txn.direction),
            date,
            time,
            description: txn.raw.clone(),
            merchant: txn.merchant.clone(),
            direction: txn.direction,
            category: category.to_string(),
            confidence: f64::from(txn.confidence) / 100.0,
            tags: Vec::new(),
            source,
            hash: txn.id.clone(),
        }
    }
}

fn signed_amount(amount: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Credit => -amount,
        _ => amount,
    }
}

fn local_date_time(timestamp_ms: i64) -> (String, String) {
    match DateTime::<Utc>::from_timestamp_millis(timestamp_ms) {
        Some(utc) => {
            let local = utc.with_timezone(&Local);
            (local.format("%Y-%m-%d").to_string(), local.format("%H:%M").to_string())
        }
        None => (String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_amounts_are_negative() {
        let c = Classification {
            amount: 500.0,
            direction: Direction::Credit,
            category: "Income".to_string(),
            party: None,
            raw: "₹500 credited".to_string(),
            hash: "h1".to_string(),
            confidence: 0.4,
            tags: vec![],
        };
        let entry = LedgerEntry::from_classification(&c, 1_767_257_400_000, EventSource::Sms);
        assert_eq!(entry.amount, -500.0);
        assert_eq!(entry.title, "Unknown");
        assert_eq!(entry.source, EventSource::Sms);
    }

    #[test]
    fn test_from_parsed_uses_reviewed_category() {
        let txn = ParsedTransaction {
            id: "txn_x".to_string(),
            raw: "Rs 120 debited to swiggy".to_string(),
            sender: None,
            amount: Some(120.0),
            currency: Some("INR".to_string()),
            direction: Direction::Debit,
            merchant: Some("Swiggy".to_string()),
            account_mask: None,
            timestamp: "ts".to_string(),
            created_at_ms: 1_767_257_400_000,
            confidence: 100,
        };
        let entry = LedgerEntry::from_parsed(&txn, "Food & Drinks", EventSource::Notification);
        assert_eq!(entry.amount, 120.0);
        assert_eq!(entry.category, "Food & Drinks");
        assert_eq!(entry.title, "Swiggy");
        assert_eq!(entry.confidence, 1.0);
    }
}
