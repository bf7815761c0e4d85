//! Derived rates, period-over-period change, and lenient metric parsing.
//!
//! Every zero denominator yields `0`, never `NaN` or infinity.

/// Click-through rate in percent.
pub fn calculate_ctr(impressions: u64, clicks: u64) -> f64 {
    if impressions > 0 {
        (clicks as f64 / impressions as f64) * 100.0
    } else {
        0.0
    }
}

/// Cost per thousand impressions.
pub fn calculate_cpm(impressions: u64, spend: f64) -> f64 {
    if impressions > 0 {
        (spend / impressions as f64) * 1000.0
    } else {
        0.0
    }
}

/// Cost per click.
pub fn calculate_cpc(clicks: u64, spend: f64) -> f64 {
    if clicks > 0 {
        spend / clicks as f64
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRates {
    pub cpc: f64,
    pub cpm: f64,
    pub ctr: f64,
}

pub fn derive_rates(impressions: u64, clicks: u64, spend: f64) -> DerivedRates {
    DerivedRates {
        cpc: calculate_cpc(clicks, spend),
        cpm: calculate_cpm(impressions, spend),
        ctr: calculate_ctr(impressions, clicks),
    }
}

/// `((current - previous) / previous) * 100`.
///
/// With `previous == 0` the ratio is undefined: the result is `0` when
/// `current` is also `0`, otherwise `100` carrying the sign of `current`.
pub fn calculate_percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current == 0.0 {
            0.0
        } else if current > 0.0 {
            100.0
        } else {
            -100.0
        };
    }
    ((current - previous) / previous) * 100.0
}

/// Decimal metric from its wire string; missing or malformed input is `0`.
pub fn parse_metric_or_zero(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Integer count from its wire string; missing, malformed or negative input
/// is `0`, a fractional value is truncated.
pub fn parse_count_or_zero(raw: Option<&str>) -> u64 {
    let Some(s) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(v) = s.parse::<u64>() {
        return v;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v.trunc() as u64,
        _ => 0,
    }
}
