//! Counterparty extraction: UPI ids, merchant/bank keywords, preposition
//! capture, and the display-only account mask.

use crate::lexicon::{Lexicons, UPI_OFFICIAL_HANDLES};

/// Extract and validate a UPI VPA (`localpart@domain`) from normalized text.
///
/// The domain must be an official PSP/bank handle, or at least a purely
/// alphabetic token; anything else is rejected rather than guessed at.
pub fn extract_upi_id(lex: &Lexicons, text: &str) -> Option<String> {
    let m = lex.upi_id.find(text)?;
    let vpa = m.as_str().to_lowercase();
    let (_, domain) = vpa.split_once('@')?;

    if UPI_OFFICIAL_HANDLES.contains(&domain) {
        return Some(vpa);
    }
    if lex.upi_generic_domain.is_match(domain) {
        return Some(vpa);
    }
    None
}

/// Extract an obfuscated account suffix (`A/c X1234`, `XX1234`, `account
/// ending 1234`) rendered as `****<digits>`. Display only; never feeds
/// dedup or classification.
pub fn extract_account_mask(lex: &Lexicons, text: &str) -> Option<String> {
    for pattern in &lex.account_masks {
        if let Some(caps) = pattern.captures(text) {
            return Some(format!("****{}", &caps[1]));
        }
    }
    None
}

/// Capture a party name after `to|at|payee|merchant|vendor|via`.
///
/// Rejects captures that are package fragments, URLs, or carry no
/// alphabetic character.
pub fn parse_party_preposition(lex: &Lexicons, text: &str) -> Option<String> {
    let caps = lex.party_preposition.captures(text)?;
    let name = caps[1].trim().to_string();

    if name.contains("com.") || name.contains("http") {
        return None;
    }
    if !name.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(name)
}

/// First-wins party chain used by the staged notification parser:
/// UPI id, then merchant keyword, then preposition capture, then bank.
///
/// The scored classifier does not use this chain; it collects scored
/// candidates instead (see `classify`).
pub fn detect_party(lex: &Lexicons, text: &str) -> Option<String> {
    if let Some(vpa) = extract_upi_id(lex, text) {
        return Some(vpa);
    }
    if let Some(merchant) = lex.merchant_hit(text) {
        return Some(merchant.to_string());
    }
    if let Some(name) = parse_party_preposition(lex, text) {
        return Some(name);
    }
    lex.bank_hit(text).map(|b| b.to_string())
}
