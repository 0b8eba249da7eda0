//! Static lexicons and compiled patterns for Indian bank/UPI transaction texts.
//!
//! Everything here is data: keyword tables, handle whitelists, and the
//! regexes the field extractors run against normalized text. Compiled once
//! in [`Lexicons::new`] and injected into the classifier, so the tables can
//! be swapped in tests without touching the extraction logic.

use anyhow::Result;
use regex::Regex;

/// Max entries kept in correction memory (keep-tail-N eviction).
pub const MEMORY_LIMIT: usize = 50;

/// Amounts at or above this are treated as noise, not transactions.
pub const AMOUNT_CEILING: f64 = 10_000_000.0;

/// Storage key for correction memory.
pub const MEMORY_KEY: &str = "txn_memory_v1";
/// Storage key for the dedup record set.
pub const DEDUPE_KEY: &str = "notif_dedupe_v1";
/// Storage key for the pending review queue.
pub const PENDING_KEY: &str = "pending_txns_v1";

/// Merchant keywords, checked in order; first match wins.
/// Key is the lowercase token searched for, value the display name.
pub const MERCHANT_KEYWORDS: &[(&str, &str)] = &[
    ("swiggy", "Swiggy"),
    ("zomato", "Zomato"),
    ("blinkit", "Blinkit"),
    ("zepto", "Zepto"),
    ("bigbasket", "BigBasket"),
    ("dmart", "DMart"),
    ("amazon", "Amazon"),
    ("flipkart", "Flipkart"),
    ("myntra", "Myntra"),
    ("uber", "Uber"),
    ("ola", "Ola"),
    ("rapido", "Rapido"),
    ("irctc", "IRCTC"),
    ("redbus", "RedBus"),
    ("netflix", "Netflix"),
    ("spotify", "Spotify"),
    ("bookmyshow", "BookMyShow"),
    ("jio", "Jio"),
    ("airtel", "Airtel"),
    ("starbucks", "Starbucks"),
    ("mcdonald", "McDonald's"),
    ("dominos", "Domino's"),
];

/// Merchant keyword -> category tag contributed by a hit.
pub const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("swiggy", "Food & Drinks"),
    ("zomato", "Food & Drinks"),
    ("starbucks", "Food & Drinks"),
    ("mcdonald", "Food & Drinks"),
    ("dominos", "Food & Drinks"),
    ("blinkit", "Groceries"),
    ("zepto", "Groceries"),
    ("bigbasket", "Groceries"),
    ("dmart", "Groceries"),
    ("amazon", "Shopping"),
    ("flipkart", "Shopping"),
    ("myntra", "Shopping"),
    ("uber", "Travel"),
    ("ola", "Travel"),
    ("rapido", "Travel"),
    ("irctc", "Travel"),
    ("redbus", "Travel"),
    ("netflix", "Entertainment"),
    ("spotify", "Entertainment"),
    ("bookmyshow", "Entertainment"),
    ("jio", "Recharge"),
    ("airtel", "Recharge"),
];

/// Bank keywords, checked in order after merchants.
pub const BANK_KEYWORDS: &[(&str, &str)] = &[
    ("hdfc", "HDFC Bank"),
    ("icici", "ICICI Bank"),
    ("sbi", "SBI"),
    ("axis", "Axis Bank"),
    ("kotak", "Kotak"),
    ("yes bank", "Yes Bank"),
    ("pnb", "PNB"),
    ("bank of baroda", "Bank of Baroda"),
    ("bob", "Bank of Baroda"),
    ("idfc", "IDFC First"),
    ("canara", "Canara Bank"),
    ("indusind", "IndusInd Bank"),
    ("federal", "Federal Bank"),
    ("union bank", "Union Bank"),
];

/// Official UPI PSP/bank handles (the part after `@` in a VPA).
pub const UPI_OFFICIAL_HANDLES: &[&str] = &[
    // Major PSPs
    "upi", "okhdfcbank", "oksbi", "okaxis", "okicici", "okkotak", "ybl",
    "ibl", "axl", "apl", "paytm", "phonepe", "gpay",
    // Banks
    "sbi", "hdfcbank", "icici", "axisbank", "kotak", "yesbank", "idfc",
    "idfcfirst", "indusind", "rbl", "federal", "canarabank", "pnb", "bob",
    "unionbank", "centralbank", "indianbank", "bankofindia", "iob",
    // Payments banks
    "airtel", "jio",
    // Small finance banks
    "ujjivan", "equitas", "au", "fincare", "suryoday", "utkarsh",
    // FinTech PSPs
    "freecharge", "mobikwik", "bharatpe", "cred", "navi", "fino",
];

/// Known SMS header / app tokens from banks, UPI apps and wallets.
/// Matched against an uppercased, alphanumeric-only rendering of the sender.
pub const KNOWN_SENDER_TOKENS: &[&str] = &[
    // Major banks
    "SBI", "SBIPSG", "SBIPAY", "SBICRD", "SBIINB", "HDFC", "HDFCBK",
    "HDFCPAY", "ICICI", "ICICIB", "AXIS", "AXISBK", "AXISUPI", "KOTAK",
    "KOTAKB", "YESBNK", "PNB", "BOB", "BARODABANK", "UNIONBANK", "IDFC",
    "IDFCFIRST", "CANARA", "INDUSIND", "INDUSBNK", "FEDERAL",
    // UPI apps
    "GOOGLEPAY", "GPAY", "TEZ", "PHONEPE", "PHNPAY", "PAYTM", "BHIM",
    "UPI", "NPCI",
    // Wallets, fintech, cards
    "AMAZONPAY", "AMZPAY", "CRED", "CREDPAY", "ONECARD", "SBICARD",
    "HDFCCARD", "SLICE", "LAZYPAY", "MOBIKWIK",
    // Payment gateways
    "RAZORPAY", "CASHFREE", "PAYU",
];

/// Compiled pattern tables. Build once, share by reference.
#[derive(Debug)]
pub struct Lexicons {
    /// Ordered amount patterns: currency prefix first, then suffix.
    pub amount_patterns: Vec<Regex>,
    /// Explicit `cr` / `dr` short tokens.
    pub cr_token: Regex,
    pub dr_token: Regex,
    /// Credit keywords beat debit keywords (documented tie-break).
    pub credit_keywords: Regex,
    pub debit_keywords: Regex,
    /// `localpart@domain` UPI VPA shape.
    pub upi_id: Regex,
    /// Generic all-alphabetic VPA domain accepted when not whitelisted.
    pub upi_generic_domain: Regex,
    /// `to|at|payee|merchant|vendor|via <name>` capture.
    pub party_preposition: Regex,
    /// Account mask shapes, in priority order.
    pub account_masks: Vec<Regex>,
    /// Sanitizer strippers.
    pub url: Regex,
    pub package_name: Regex,
    /// Security-alert / phishing phrasing that must never classify.
    pub suspicious: Regex,
}

impl Lexicons {
    pub fn new() -> Result<Self> {
        Ok(Self {
            amount_patterns: vec![
                Regex::new(r"(?i)(?:₹|rs\.?|inr)\s*([0-9]{1,3}(?:[0-9,]*)(?:\.[0-9]{1,2})?)")?,
                Regex::new(r"(?i)([0-9]{1,3}(?:[0-9,]*)(?:\.[0-9]{1,2})?)\s*(?:inr|rs\.?|₹)")?,
            ],
            cr_token: Regex::new(r"(?i)\bcr\b\.?")?,
            dr_token: Regex::new(r"(?i)\bdr\b\.?")?,
            credit_keywords: Regex::new(
                r"(?i)\b(credited|refund|cashback|deposit|received|deposited)\b",
            )?,
            debit_keywords: Regex::new(
                r"(?i)\b(debited|spent|paid|withdrawn|payment|txn|transfer|withdraw)\b",
            )?,
            upi_id: Regex::new(r"[a-z0-9._-]{3,256}@[a-z]{2,30}")?,
            upi_generic_domain: Regex::new(r"^[a-z]{2,20}$")?,
            party_preposition: Regex::new(
                r"(?i)\b(?:to|at|payee|merchant|vendor|via)[:\s-]+([a-z0-9&._\- ]{3,60})",
            )?,
            account_masks: vec![
                Regex::new(r"(?i)\ba/?c(?:count)?\s*(?:no\.?\s*)?(?:ending(?:\s+in)?\s*|x*)(\d{2,6})\b")?,
                Regex::new(r"(?i)\bx{1,2}(\d{3,6})\b")?,
            ],
            url: Regex::new(r"(?i)https?://\S+|www\.\S+")?,
            package_name: Regex::new(r"\b[a-z][a-z0-9_]*(?:\.[a-z0-9_]+){2,}\b")?,
            suspicious: Regex::new(
                r"(?i)\b(fraud|phishing|suspicious activity|blocked|kyc\s+(?:expired|pending)|do not share|security alert|unauthori[sz]ed|account (?:is )?locked|will be suspended)\b",
            )?,
        })
    }

    /// Look up a merchant keyword hit (first table entry found in the text).
    pub fn merchant_hit(&self, text: &str) -> Option<&'static str> {
        MERCHANT_KEYWORDS
            .iter()
            .find(|(key, _)| text.contains(key))
            .map(|(_, name)| *name)
    }

    /// Look up a bank keyword hit.
    pub fn bank_hit(&self, text: &str) -> Option<&'static str> {
        BANK_KEYWORDS
            .iter()
            .find(|(key, _)| text.contains(key))
            .map(|(_, name)| *name)
    }

    /// Category tag for a merchant keyword, if one is mapped.
    pub fn tag_for(&self, keyword: &str) -> Option<&'static str> {
        TAG_KEYWORDS
            .iter()
            .find(|(key, _)| *key == keyword)
            .map(|(_, tag)| *tag)
    }
}

/// Whether a sender header/app id looks like a known bank/PSP source.
///
/// Normalizes to uppercase alphanumerics so `AX-HDFCBK` and
/// `com.phonepe.app` both resolve against the token table.
pub fn is_sender_whitelisted(sender: Option<&str>) -> bool {
    let Some(sender) = sender else {
        return false;
    };

    let normalized: String = sender
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase();
    if normalized.is_empty() {
        return false;
    }

    KNOWN_SENDER_TOKENS.iter().any(|t| normalized.contains(t))
}
