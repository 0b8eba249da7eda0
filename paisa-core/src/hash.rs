//! Content fingerprinting for dedup.
//!
//! FNV-1a 32-bit over UTF-8 bytes, rendered base36. Explicitly
//! non-cryptographic: collisions are a tolerated low-probability risk, not
//! actively resolved.

const FNV_OFFSET: u32 = 2166136261;
const FNV_PRIME: u32 = 16777619;

fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= u32::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Stable content hash of a raw text.
pub fn fingerprint(text: &str) -> String {
    to_base36(fnv1a_32(text.as_bytes()))
}

/// Deterministic id for a delivered event, stable across redelivery of the
/// identical `(sender, text)` pair.
pub fn event_id(sender: Option<&str>, text: &str) -> String {
    let key = format!("{}||{}", sender.unwrap_or_default(), text);
    format!("txn_{}", to_base36(fnv1a_32(key.as_bytes())))
}
