//! Text normalization and the suspicious-text gate.
//!
//! Raw notification bodies arrive with URLs, app package names, emoji and
//! stray control characters. Everything downstream matches against the
//! sanitized + normalized form, so extraction patterns stay simple.

use crate::lexicon::Lexicons;

/// Strip URLs, package-name tokens and non-ASCII noise, collapse whitespace.
///
/// The rupee sign survives the ASCII filter: amount extraction keys off it.
pub fn sanitize(lex: &Lexicons, text: &str) -> String {
    let without_urls = lex.url.replace_all(text, " ");
    let without_packages = lex.package_name.replace_all(&without_urls, " ");

    let ascii_only: String = without_packages
        .chars()
        .map(|c| {
            if c == '₹' || (c.is_ascii() && !c.is_ascii_control()) {
                c
            } else {
                ' '
            }
        })
        .collect();

    collapse_whitespace(&ascii_only)
}

/// Lowercase and collapse whitespace. Applied after [`sanitize`] to produce
/// the text every extractor matches against.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// Security-alert / phishing phrasing that must never produce a financial
/// entry, even when the text carries an amount.
pub fn is_suspicious(lex: &Lexicons, text: &str) -> bool {
    lex.suspicious.is_match(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
