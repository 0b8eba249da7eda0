//! Scored transaction classifier (direct-to-ledger path).
//!
//! Orchestrates the sanitizer, field extractors, heuristic scorer and
//! correction memory into a single `Classification`. Pure given its inputs
//! plus the current memory contents: no I/O, safe to call repeatedly for
//! the same text.
//!
//! Scoring:
//! - UPI mention        +3
//! - ATM mention        +5
//! - merchant keyword   +4 per hit (also contributes a category tag)
//! - credit keyword     +6 per hit
//! - debit keyword      +5 per hit

use crate::extract::{detect_direction, extract_amount};
use crate::hash::fingerprint;
use crate::lexicon::{Lexicons, MERCHANT_KEYWORDS};
use crate::memory::CorrectionStore;
use crate::sanitize::{is_suspicious, normalize, sanitize};
use crate::types::{Classification, Direction};

/// When credit and debit evidence scores tie, pick debit.
///
/// Inherited fallback ordering, kept as a named constant so the policy can
/// be revisited without code surgery.
pub const DIRECTION_TIE_BREAK: Direction = Direction::Debit;

const SCORE_UPI: i32 = 3;
const SCORE_ATM: i32 = 5;
const SCORE_MERCHANT: i32 = 4;
const SCORE_CREDIT: i32 = 6;
const SCORE_DEBIT: i32 = 5;

/// Party-candidate weights (merchant beats bank on the base weight; scored
/// mentions carry their accumulated keyword score).
const PARTY_WEIGHT_MERCHANT: i32 = 3;
const PARTY_WEIGHT_BANK: i32 = 2;

/// Divisor turning accumulated evidence into a confidence in [0.15, 1.0].
const CONFIDENCE_NORMALIZER: f64 = 15.0;
const CONFIDENCE_FLOOR: f64 = 0.15;

/// Accumulated heuristic evidence for one text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Signals {
    pub upi: i32,
    pub atm: i32,
    pub credit: i32,
    pub debit: i32,
    /// (display name, accumulated score) per merchant keyword hit.
    pub merchant_hits: Vec<(String, i32)>,
    /// Category tags contributed by merchant hits, insertion-ordered.
    pub tags: Vec<String>,
}

/// Category rules, evaluated in this order; the first that produces a
/// category wins. Priority is data, not an if/else chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoryRule {
    /// Learned correction for the resolved party.
    Learned,
    /// First heuristic tag from merchant hits.
    HeuristicTag,
    /// Credit direction means income.
    CreditIncome,
    AtmWithdrawal,
    UpiPayment,
    /// A bank was identified but nothing more specific.
    BankDebit,
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule::Learned,
    CategoryRule::HeuristicTag,
    CategoryRule::CreditIncome,
    CategoryRule::AtmWithdrawal,
    CategoryRule::UpiPayment,
    CategoryRule::BankDebit,
];

const CATEGORY_FALLBACK: &str = "Expense";

pub struct Classifier {
    lexicons: Lexicons,
}

impl Classifier {
    pub fn new(lexicons: Lexicons) -> Self {
        Self { lexicons }
    }

    pub fn lexicons(&self) -> &Lexicons {
        &self.lexicons
    }

    /// Classify a raw notification/SMS text.
    ///
    /// Returns `None` for empty/suspicious texts and for texts without a
    /// positive in-range amount; a transaction without a monetary figure
    /// carries no actionable signal.
    pub fn classify(&self, memory: &CorrectionStore, raw: &str) -> Option<Classification> {
        let lex = &self.lexicons;

        let sanitized = sanitize(lex, raw);
        if sanitized.is_empty() {
            return None;
        }
        let text = normalize(&sanitized);
        if is_suspicious(lex, &text) {
            return None;
        }

        let amount = extract_amount(lex, &text)?;

        let signals = score_signals(lex, &text);
        let merchant = lex.merchant_hit(&text);
        let bank = lex.bank_hit(&text);

        let explicit = detect_direction(lex, &text, Some(amount));
        let direction = resolve_direction(explicit, &signals);

        let party = resolve_party(merchant, bank, &signals);
        let category = resolve_category(memory, party.as_deref(), &signals, direction, bank);

        let evidence = f64::from(
            if merchant.is_some() { PARTY_WEIGHT_MERCHANT } else { 0 }
                + if bank.is_some() { PARTY_WEIGHT_BANK } else { 0 }
                + signals.upi
                + signals.atm
                + signals.credit
                + signals.debit,
        );
        let confidence = (evidence / CONFIDENCE_NORMALIZER).clamp(CONFIDENCE_FLOOR, 1.0);

        Some(Classification {
            amount,
            direction,
            category,
            party,
            raw: raw.to_string(),
            hash: fingerprint(raw),
            confidence,
            tags: signals.tags,
        })
    }
}

/// Accumulate point-valued evidence from the normalized text.
pub fn score_signals(lex: &Lexicons, text: &str) -> Signals {
    let mut signals = Signals::default();

    if text.contains("upi") {
        signals.upi += SCORE_UPI;
    }
    if text.contains("atm") {
        signals.atm += SCORE_ATM;
    }

    for (keyword, name) in MERCHANT_KEYWORDS {
        if !text.contains(keyword) {
            continue;
        }
        match signals.merchant_hits.iter_mut().find(|(n, _)| n == name) {
            Some((_, score)) => *score += SCORE_MERCHANT,
            None => signals.merchant_hits.push((name.to_string(), SCORE_MERCHANT)),
        }
        if let Some(tag) = lex.tag_for(keyword) {
            if !signals.tags.iter().any(|t| t == tag) {
                signals.tags.push(tag.to_string());
            }
        }
    }

    signals.credit = lex.credit_keywords.find_iter(text).count() as i32 * SCORE_CREDIT;
    signals.debit = lex.debit_keywords.find_iter(text).count() as i32 * SCORE_DEBIT;

    signals
}

/// Prefer the explicit keyword direction; fall back to comparing the
/// accumulated credit vs debit scores, ties going to
/// [`DIRECTION_TIE_BREAK`]. No evidence at all stays `Unknown`.
pub fn resolve_direction(explicit: Direction, signals: &Signals) -> Direction {
    if explicit.is_known() {
        return explicit;
    }
    if signals.credit == 0 && signals.debit == 0 {
        return Direction::Unknown;
    }
    if signals.credit > signals.debit {
        Direction::Credit
    } else if signals.debit > signals.credit {
        Direction::Debit
    } else {
        DIRECTION_TIE_BREAK
    }
}

/// Pick the highest-scored party candidate. Candidates are inserted
/// merchant-keyword first, then bank, then scored mentions, and ties keep
/// the earliest insertion.
fn resolve_party(merchant: Option<&str>, bank: Option<&str>, signals: &Signals) -> Option<String> {
    let mut candidates: Vec<(&str, i32)> = Vec::new();
    if let Some(m) = merchant {
        candidates.push((m, PARTY_WEIGHT_MERCHANT));
    }
    if let Some(b) = bank {
        candidates.push((b, PARTY_WEIGHT_BANK));
    }
    for (name, score) in &signals.merchant_hits {
        candidates.push((name.as_str(), *score));
    }

    let mut best: Option<(&str, i32)> = None;
    for (name, score) in candidates {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((name, score)),
        }
    }
    best.map(|(name, _)| name.to_string())
}

fn resolve_category(
    memory: &CorrectionStore,
    party: Option<&str>,
    signals: &Signals,
    direction: Direction,
    bank: Option<&str>,
) -> String {
    for rule in CATEGORY_RULES {
        let hit = match rule {
            CategoryRule::Learned => party
                .and_then(|p| memory.lookup(p))
                .map(|c| c.to_string()),
            CategoryRule::HeuristicTag => signals.tags.first().cloned(),
            CategoryRule::CreditIncome => {
                (direction == Direction::Credit).then(|| "Income".to_string())
            }
            CategoryRule::AtmWithdrawal => {
                (signals.atm > 0).then(|| "ATM Withdrawal".to_string())
            }
            CategoryRule::UpiPayment => (signals.upi > 0).then(|| "UPI Payment".to_string()),
            CategoryRule::BankDebit => bank.map(|_| "Bank Debit".to_string()),
        };
        if let Some(category) = hit {
            return category;
        }
    }
    CATEGORY_FALLBACK.to_string()
}
