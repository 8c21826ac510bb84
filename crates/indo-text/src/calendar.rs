//! Indonesian calendar names and date narration

use crate::terbilang::{capitalize_first, to_words};
use crate::{IndoTextError, Result};
use chrono::{Datelike, NaiveDate};

/// Weekday names, Sunday first
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jum'at", "Sabtu",
];

/// Month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Indonesian weekday name of a date
pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

/// Indonesian month name (1-12); out of range yields `None`
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
}

/// Format date as "05 Januari 2025"
pub fn format_date_long(date: NaiveDate) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        MONTH_NAMES[date.month0() as usize],
        date.year()
    )
}

/// Parse an ISO `YYYY-MM-DD` date, tolerating a trailing time part
///
/// # Arguments
/// * `input` - Date string such as `2025-01-05` or `2025-01-05T08:00:00Z`
pub fn parse_iso_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| IndoTextError::InvalidDate(input.to_string()))
}

/// A date spelled out the way official minutes open
///
/// Renders as `"Senin tanggal Lima bulan Januari tahun Dua Ribu Dua Puluh Lima"`;
/// the pieces are kept apart so callers can style each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateNarration {
    /// Weekday name ("Senin")
    pub weekday: &'static str,
    /// Day of month in words ("Lima")
    pub day: String,
    /// Month name ("Januari")
    pub month: &'static str,
    /// Year in words ("Dua Ribu Dua Puluh Lima")
    pub year: String,
}

impl DateNarration {
    /// Narrate a calendar date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            weekday: weekday_name(date),
            day: spelled_or_digits(date.day() as u64),
            month: MONTH_NAMES[date.month0() as usize],
            year: spelled_or_digits(date.year().max(0) as u64),
        }
    }

    /// Plain single-string form without styling
    pub fn sentence(&self) -> String {
        format!(
            "{} tanggal {} bulan {} tahun {}",
            self.weekday, self.day, self.month, self.year
        )
    }
}

fn spelled_or_digits(n: u64) -> String {
    let words = to_words(n);
    if words.is_empty() {
        n.to_string()
    } else {
        capitalize_first(&words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekday_name() {
        // 2025-01-05 is a Sunday
        assert_eq!(weekday_name(date(2025, 1, 5)), "Minggu");
        assert_eq!(weekday_name(date(2025, 1, 6)), "Senin");
        assert_eq!(weekday_name(date(2025, 1, 10)), "Jum'at");
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("Januari"));
        assert_eq!(month_name(12), Some("Desember"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_format_date_long() {
        assert_eq!(format_date_long(date(2025, 1, 5)), "05 Januari 2025");
        assert_eq!(format_date_long(date(2024, 12, 25)), "25 Desember 2024");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2025-03-17").unwrap(), date(2025, 3, 17));
        assert_eq!(
            parse_iso_date("2025-03-17T10:00:00.000Z").unwrap(),
            date(2025, 3, 17)
        );
        assert!(parse_iso_date("17/03/2025").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn test_narration() {
        let narration = DateNarration::new(date(2025, 1, 6));
        assert_eq!(narration.weekday, "Senin");
        assert_eq!(narration.day, "Enam");
        assert_eq!(narration.month, "Januari");
        assert_eq!(narration.year, "Dua Ribu Dua Puluh Lima");
        assert_eq!(
            narration.sentence(),
            "Senin tanggal Enam bulan Januari tahun Dua Ribu Dua Puluh Lima"
        );
    }

    #[test]
    fn test_narration_twenty_fifth() {
        let narration = DateNarration::new(date(2023, 8, 25));
        assert_eq!(narration.day, "Dua Puluh Lima");
        assert_eq!(narration.year, "Dua Ribu Dua Puluh Tiga");
    }
}
