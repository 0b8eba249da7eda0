//! Shared types for the classification pipeline.

use serde::{Deserialize, Serialize};

/// Money flow direction inferred from a transaction text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
    #[default]
    Unknown,
}

impl Direction {
    pub fn is_known(&self) -> bool {
        *self != Direction::Unknown
    }
}

/// Output of the staged notification parser (surfaced to the review UI).
///
/// Built only when at least one of {amount, merchant, known direction}
/// was extracted; otherwise parsing yields nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTransaction {
    /// Deterministic id over sender + raw text (stable across redelivery).
    pub id: String,
    pub raw: String,
    pub sender: Option<String>,
    pub amount: Option<f64>,
    /// Set iff `amount` is present.
    pub currency: Option<String>,
    pub direction: Direction,
    pub merchant: Option<String>,
    /// Obfuscated account suffix, e.g. `****1234`. Display only.
    pub account_mask: Option<String>,
    /// Human-readable timestamp, formatted at parse time.
    pub timestamp: String,
    /// Epoch milliseconds of the originating event.
    pub created_at_ms: i64,
    /// Integer 0-100.
    pub confidence: u8,
}

/// Output of the scored classifier (direct-to-ledger path).
///
/// Built only when a positive in-range amount was extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub amount: f64,
    pub direction: Direction,
    pub category: String,
    pub party: Option<String>,
    pub raw: String,
    /// Non-cryptographic content fingerprint of the raw text, for dedup.
    pub hash: String,
    /// 0.0-1.0.
    pub confidence: f64,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Credit).unwrap(), "\"credit\"");
        assert_eq!(serde_json::to_string(&Direction::Unknown).unwrap(), "\"unknown\"");
    }

    #[test]
    fn test_parsed_transaction_round_trips_camel_case() {
        let txn = ParsedTransaction {
            id: "txn_abc".to_string(),
            raw: "Rs 100 debited".to_string(),
            sender: None,
            amount: Some(100.0),
            currency: Some("INR".to_string()),
            direction: Direction::Debit,
            merchant: None,
            account_mask: Some("****1234".to_string()),
            timestamp: "01 Jan 2026, 09:00 AM".to_string(),
            created_at_ms: 1_767_257_400_000,
            confidence: 80,
        };

        let json = serde_json::to_string(&txn).unwrap();
        assert!(json.contains("\"accountMask\""));
        assert!(json.contains("\"createdAtMs\""));

        let back: ParsedTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txn);
    }
}
