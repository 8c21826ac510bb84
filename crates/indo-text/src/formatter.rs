//! Rupiah amount parsing and formatting

use crate::{calendar, terbilang};
use chrono::NaiveDate;

/// Indonesian thousands separator
const THOUSANDS_SEP: char = '.';

/// Indonesian decimal separator
const DECIMAL_SEP: char = ',';

/// Largest magnitude [`format_amount`] prints; sen stay exact below it
pub const MAX_AMOUNT: f64 = 1e15;

/// Indonesian text formatting utilities
pub struct IndoFormatter;

impl IndoFormatter {
    /// Parse a free-form amount string
    pub fn parse_amount(input: &str) -> f64 {
        parse_amount(input)
    }

    /// Format an amount in Indonesian notation
    pub fn format_amount(value: f64, decimals: u8) -> String {
        format_amount(value, decimals)
    }

    /// Spell a whole number in Indonesian words
    pub fn format_number(n: u64) -> String {
        terbilang::to_words(n)
    }

    /// Spell an amount as "... Rupiah"
    pub fn format_rupiah_words(amount: f64) -> String {
        terbilang::rupiah_words(amount)
    }

    /// Format a date as "05 Januari 2025"
    pub fn format_date_long(date: NaiveDate) -> String {
        calendar::format_date_long(date)
    }
}

/// Parse an amount written in either Indonesian or international notation
///
/// The notation is decided by the last separator: when the last `,` comes
/// after the last `.`, the string is Indonesian (`.` groups thousands, `,`
/// is the decimal mark); otherwise it is international. A string of dots
/// only, where every group after the first has exactly three digits
/// (`"1.500.000"`), is Indonesian grouping. A leading `Rp` prefix is
/// ignored. Anything unparseable yields `0.0`.
///
/// # Examples
/// ```
/// use indo_text::parse_amount;
/// assert_eq!(parse_amount("1.234.567,89"), 1234567.89);
/// assert_eq!(parse_amount("1,234,567.89"), 1234567.89);
/// assert_eq!(parse_amount("Rp. 15.000,00"), 15000.0);
/// assert_eq!(parse_amount("10.000.000"), 10000000.0);
/// assert_eq!(parse_amount("12.50"), 12.5);
/// assert_eq!(parse_amount("abc"), 0.0);
/// ```
pub fn parse_amount(input: &str) -> f64 {
    let s = strip_currency_prefix(input.trim());
    if s.is_empty() {
        return 0.0;
    }

    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');

    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => indonesian_to_plain(s),
        (Some(_), None) => indonesian_to_plain(s),
        (None, Some(_)) if is_dot_grouped(s) => s.replace(THOUSANDS_SEP, ""),
        _ => s.replace(',', ""),
    };

    let cleaned: String = normalized
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    parse_float_prefix(&cleaned).unwrap_or(0.0)
}

/// Drop a leading `Rp`, `Rp.`, `rp ` etc.
fn strip_currency_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[..2].eq_ignore_ascii_case(b"rp") {
        let rest = &s[2..];
        let rest = rest.strip_prefix('.').unwrap_or(rest);
        return rest.trim_start();
    }
    s
}

/// `1.000`, `-25.000`, `1.234.567`: one to three leading digits (no
/// leading zero), then dot-separated groups of exactly three
fn is_dot_grouped(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split(THOUSANDS_SEP);
    let lead_ok = groups
        .next()
        .is_some_and(|g| {
            (1..=3).contains(&g.len())
                && !g.starts_with('0')
                && g.bytes().all(|b| b.is_ascii_digit())
        });
    let mut rest = groups.peekable();
    lead_ok
        && rest.peek().is_some()
        && rest.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Remove thousands dots and turn the first decimal comma into a dot
fn indonesian_to_plain(s: &str) -> String {
    s.replace(THOUSANDS_SEP, "").replacen(DECIMAL_SEP, ".", 1)
}

/// Parse the longest numeric prefix (`-?digits[.digits]`)
///
/// Trailing garbage such as a second decimal point or an inner minus sign is
/// ignored, so `"1.2.3"` reads as `1.2`.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Format an amount with Indonesian grouping
///
/// `decimals` is either 0 (whole rupiah) or 2 (sen); any other non-zero value
/// behaves like 2. A zero fractional part is never printed. Magnitudes above
/// [`MAX_AMOUNT`] are clamped to it.
///
/// # Examples
/// ```
/// use indo_text::format_amount;
/// assert_eq!(format_amount(1234567.0, 0), "1.234.567");
/// assert_eq!(format_amount(1234567.5, 2), "1.234.567,50");
/// assert_eq!(format_amount(1234567.0, 2), "1.234.567");
/// ```
pub fn format_amount(value: f64, decimals: u8) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let magnitude = value.abs().min(MAX_AMOUNT);
    let cents = (magnitude * 100.0).round() as i64;
    let (int_part, frac_part) = if decimals == 0 {
        (magnitude.round() as i64, 0)
    } else {
        (cents / 100, cents % 100)
    };

    let sign = if value < 0.0 && (int_part > 0 || frac_part > 0) {
        "-"
    } else {
        ""
    };

    let int_str = format_with_thousands(int_part, THOUSANDS_SEP);

    if frac_part == 0 {
        format!("{sign}{int_str}")
    } else {
        format!("{sign}{int_str}{DECIMAL_SEP}{frac_part:02}")
    }
}

/// Format an amount with the `Rp ` prefix used in document tables
pub fn format_rupiah(value: f64) -> String {
    format!("Rp {}", format_amount(value, 2))
}

/// Format integer with thousand separators
fn format_with_thousands(n: i64, sep: char) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indonesian_notation() {
        assert_eq!(parse_amount("1.234.567,89"), 1234567.89);
        assert_eq!(parse_amount("15.000.000,50"), 15000000.5);
        assert_eq!(parse_amount("0,5"), 0.5);
    }

    #[test]
    fn test_parse_international_notation() {
        assert_eq!(parse_amount("1,234,567.89"), 1234567.89);
        assert_eq!(parse_amount("15000000.50"), 15000000.5);
        assert_eq!(parse_amount("1000000"), 1000000.0);
    }

    #[test]
    fn test_parse_currency_prefix() {
        assert_eq!(parse_amount("Rp 1.500"), 1500.0);
        assert_eq!(parse_amount("Rp. 1.500,00"), 1500.0);
        assert_eq!(parse_amount("rp2.000,25"), 2000.25);
        assert_eq!(parse_amount("RP 750"), 750.0);
    }

    #[test]
    fn test_parse_dot_grouping() {
        assert_eq!(parse_amount("1.000"), 1000.0);
        assert_eq!(parse_amount("10.000.000"), 10000000.0);
        assert_eq!(parse_amount("-25.000"), -25000.0);
        assert_eq!(parse_amount("Rp1.234.567"), 1234567.0);
        // not three-digit groups: a decimal point
        assert_eq!(parse_amount("12.50"), 12.5);
        assert_eq!(parse_amount("1.0000"), 1.0);
        assert_eq!(parse_amount("1234.567"), 1234.567);
        assert_eq!(parse_amount("0.125"), 0.125);
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("   "), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("-"), 0.0);
        assert_eq!(parse_amount("."), 0.0);
    }

    #[test]
    fn test_parse_negative_and_prefix_only() {
        assert_eq!(parse_amount("-1.250,5"), -1250.5);
        assert_eq!(parse_amount("1.2.3"), 1.2);
        assert_eq!(parse_amount("12-3"), 12.0);
    }

    #[test]
    fn test_format_whole() {
        assert_eq!(format_amount(0.0, 0), "0");
        assert_eq!(format_amount(999.0, 0), "999");
        assert_eq!(format_amount(1000.0, 0), "1.000");
        assert_eq!(format_amount(1234567.0, 0), "1.234.567");
        assert_eq!(format_amount(1234567.6, 0), "1.234.568");
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_amount(1234567.5, 2), "1.234.567,50");
        assert_eq!(format_amount(1234567.0, 2), "1.234.567");
        assert_eq!(format_amount(0.05, 2), "0,05");
        assert_eq!(format_amount(-1500.25, 2), "-1.500,25");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_amount(f64::NAN, 2), "0");
        assert_eq!(format_amount(f64::INFINITY, 0), "0");
    }

    #[test]
    fn test_round_trip() {
        for v in [
            0.0, 1.0, 12.34, 1000.0, 25000.0, 1234567.0, 1500000.0, 1234567.89, 999999.99, 50.5,
            -4000.0,
        ] {
            let formatted = format_amount(v, 2);
            assert!((parse_amount(&formatted) - v).abs() < 1e-9, "{v} -> {formatted}");
        }
    }

    #[test]
    fn test_format_clamps_huge_values() {
        assert_eq!(format_amount(1e20, 0), "1.000.000.000.000.000");
        assert_eq!(format_amount(-1e20, 2), "-1.000.000.000.000.000");
        assert_eq!(format_amount(MAX_AMOUNT, 2), format_amount(f64::MAX, 2));
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(1500000.0), "Rp 1.500.000");
        assert_eq!(format_rupiah(99.9), "Rp 99,90");
    }

    #[test]
    fn test_format_with_thousands() {
        assert_eq!(format_with_thousands(1000, '.'), "1.000");
        assert_eq!(format_with_thousands(1000000, '.'), "1.000.000");
        assert_eq!(format_with_thousands(100, '.'), "100");
        assert_eq!(format_with_thousands(0, '.'), "0");
    }
}
