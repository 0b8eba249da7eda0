//! Stateless field extractors: amount and direction.
//!
//! All functions take normalized (lowercase, whitespace-collapsed) text and
//! return `None` / `Unknown` when no signal is present. No extraction
//! failure is an error.

use crate::lexicon::{AMOUNT_CEILING, Lexicons};
use crate::types::Direction;

/// Pull the transaction amount out of a text.
///
/// Patterns are tried in priority order (currency prefix beats suffix);
/// within a pattern the first finite match inside `(0, AMOUNT_CEILING)`
/// wins. Out-of-range candidates are rejected, never clamped.
pub fn extract_amount(lex: &Lexicons, text: &str) -> Option<f64> {
    for pattern in &lex.amount_patterns {
        for caps in pattern.captures_iter(text) {
            let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            if cleaned.is_empty() {
                continue;
            }

            let Ok(n) = cleaned.parse::<f64>() else {
                continue;
            };
            if n.is_finite() && n > 0.0 && n < AMOUNT_CEILING {
                return Some(n);
            }
        }
    }
    None
}

/// Infer credit/debit from keyword evidence.
///
/// Precedence:
/// 1. explicit `cr` / `dr` whole-word tokens
/// 2. credit keyword set (checked before debit; credit wins when both match)
/// 3. `debited`/`deducted` fallback when an amount is present
pub fn detect_direction(lex: &Lexicons, text: &str, amount: Option<f64>) -> Direction {
    if lex.cr_token.is_match(text) {
        return Direction::Credit;
    }
    if lex.dr_token.is_match(text) {
        return Direction::Debit;
    }

    if lex.credit_keywords.is_match(text) {
        return Direction::Credit;
    }
    if lex.debit_keywords.is_match(text) {
        return Direction::Debit;
    }

    if amount.is_some() && (text.contains("debited") || text.contains("deducted")) {
        return Direction::Debit;
    }

    Direction::Unknown
}
