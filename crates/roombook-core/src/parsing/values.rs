use crate::error::RoombookError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Markers a report prints in place of a number.
fn is_blank_marker(s: &str) -> bool {
    matches!(s, "" | "-" | "—" | "n/a" | "N/A" | "n.a.")
}

/// Strip currency signs and thousands separators.
///
/// - "1,050.00" -> "1050.00"
/// - "$ 99.50" -> "99.50"
fn clean_number(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | ' '))
        .collect()
}

/// Parse a money cell such as "1,050.00" or "$99.50".
///
/// Accounting negatives like "(150.00)" parse as -150.00. Returns Ok(None)
/// for blank cells and dash markers.
pub fn parse_money(s: &str) -> Result<Option<Decimal>, RoombookError> {
    let s = s.trim();
    if is_blank_marker(s) {
        return Ok(None);
    }
    let (negative, body) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let cleaned = clean_number(body);
    let amount = Decimal::from_str(&cleaned)
        .map_err(|e| RoombookError::ParseError(format!("invalid amount '{}': {}", s, e)))?;
    Ok(Some(if negative { -amount } else { amount }))
}

/// Parse a whole-number cell such as "7" or "1,204".
///
/// A trailing ".00" is accepted since some reports format counts as money.
pub fn parse_count(s: &str) -> Result<Option<u32>, RoombookError> {
    let s = s.trim();
    if is_blank_marker(s) {
        return Ok(None);
    }
    let cleaned = clean_number(s);
    let whole = match cleaned.split_once('.') {
        Some((int, frac)) if frac.chars().all(|c| c == '0') => int.to_string(),
        _ => cleaned,
    };
    whole
        .parse::<u32>()
        .map(Some)
        .map_err(|e| RoombookError::ParseError(format!("invalid count '{}': {}", s, e)))
}

/// Parse a room number, which must be a plain positive integer.
pub fn parse_room_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|n| *n > 0)
}
