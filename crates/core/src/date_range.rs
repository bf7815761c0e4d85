//! Calendar date ranges and the `YYYY-MM-DD` range validator.

use crate::error::ReportError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Every day from `start` to `end`, both included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start_str(), self.end_str())
    }
}

fn has_iso_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

/// Exact `YYYY-MM-DD` naming a real calendar day.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if !has_iso_shape(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Accepts two exact `YYYY-MM-DD` strings naming real days with
/// `start <= end`. Anything else is rejected.
pub fn validate_date_range(start: &str, end: &str) -> Result<DateRange, ReportError> {
    let invalid = || ReportError::InvalidDateRange {
        start: start.to_string(),
        end: end.to_string(),
    };
    let start_date = parse_iso_date(start).ok_or_else(invalid)?;
    let end_date = parse_iso_date(end).ok_or_else(invalid)?;
    if start_date > end_date {
        return Err(invalid());
    }
    Ok(DateRange {
        start: start_date,
        end: end_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_valid_range() {
        let range = validate_date_range("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start, d("2024-01-01"));
        assert_eq!(range.end, d("2024-01-31"));
        assert_eq!(range.day_count(), 31);
    }

    #[test]
    fn test_single_day_range() {
        let range = validate_date_range("2024-02-29", "2024-02-29").unwrap();
        assert_eq!(range.day_count(), 1);
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_rejects_reversed_range() {
        assert!(matches!(
            validate_date_range("2024-02-02", "2024-02-01"),
            Err(ReportError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for (start, end) in [
            ("2024-1-01", "2024-01-02"),
            ("2024/01/01", "2024-01-02"),
            ("2024-01-01T00:00", "2024-01-02"),
            ("", "2024-01-02"),
            ("2024-02-30", "2024-03-01"),
            ("2024-01-01", "tomorrow"),
        ] {
            assert!(validate_date_range(start, end).is_err(), "{start}..{end} accepted");
        }
    }

    #[test]
    fn test_days_cross_month_boundary() {
        let range = validate_date_range("2024-01-30", "2024-02-02").unwrap();
        let days: Vec<String> = range.days().map(|d| d.format(DATE_FORMAT).to_string()).collect();
        assert_eq!(days, vec!["2024-01-30", "2024-01-31", "2024-02-01", "2024-02-02"]);
    }

    #[test]
    fn test_new_rejects_start_after_end() {
        assert!(DateRange::new(d("2024-03-02"), d("2024-03-01")).is_err());
        assert_eq!(DateRange::new(d("2024-03-01"), d("2024-03-01")).unwrap().to_string(), "2024-03-01 - 2024-03-01");
    }
}
