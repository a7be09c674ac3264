//! Status and date formatting for bill listings.

use chrono::{Datelike, NaiveDate};
use shared::{domain::BillStatus, error::FormatError};

const FRENCH_MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Maps a raw status code to its French label.
pub fn format_status(code: &str) -> Result<&'static str, FormatError> {
    BillStatus::from_code(code).map(BillStatus::label)
}

/// `2004-04-04` becomes `4 Avr. 04`. Anything that is not an ISO calendar
/// date is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") else {
        return raw.to_string();
    };
    let month = FRENCH_MONTHS[date.month0() as usize];
    format!(
        "{} {}. {:02}",
        date.day(),
        month,
        date.year().rem_euclid(100)
    )
}

/// Reads a form field the way an HTML number input is read: leading
/// whitespace, an optional sign, then as many digits as are present.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
