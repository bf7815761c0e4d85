//! Gap-filling of a campaign's daily series over a date range.

use metareport_core::date_range::DATE_FORMAT;
use metareport_core::types::DailyMetric;
use metareport_core::DateRange;
use std::collections::HashSet;

/// ISO date strings for every day of `range`, ascending.
pub fn generate_date_sequence(range: &DateRange) -> Vec<String> {
    range
        .days()
        .map(|day| day.format(DATE_FORMAT).to_string())
        .collect()
}

/// Returns a new series with one entry per day of `range`. Existing entries
/// keep their values, missing days are zero-filled, and the result is sorted
/// by date string. The input is left untouched.
pub fn ensure_daily_breakdown(breakdown: &[DailyMetric], range: &DateRange) -> Vec<DailyMetric> {
    let present: HashSet<&str> = breakdown.iter().map(|d| d.date.as_str()).collect();

    let mut result = breakdown.to_vec();
    result.extend(
        generate_date_sequence(range)
            .into_iter()
            .filter(|date| !present.contains(date.as_str()))
            .map(DailyMetric::zero),
    );
    result.sort_by(|a, b| a.date.cmp(&b.date));
    result
}
