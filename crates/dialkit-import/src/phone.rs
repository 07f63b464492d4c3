//! Phone number normalization.
//!
//! Uses manual character scanning rather than `regex` to stay
//! dependency-light; the accepted formatting set is small and fixed.

/// Fewest digits a dialable number can have (short regional numbers).
const MIN_DIGITS: usize = 7;
/// E.164 ceiling.
const MAX_DIGITS: usize = 15;

/// Reduces a raw phone string to its digits-only normalized form.
///
/// Stripping rules:
/// - whitespace, hyphens, parentheses, and dots are removed
/// - one leading `+` (international prefix) is removed
///
/// Returns `Some(digits)` when the remainder is 7–15 ASCII digits.
/// Any other surviving character — a letter, a mid-string `+`, an
/// extension marker — rejects the whole value.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '-' | '(' | ')' | '.' => {}
            c if c.is_whitespace() => {}
            _ => return None,
        }
    }

    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        Some(digits)
    } else {
        None
    }
}
