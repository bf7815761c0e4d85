use crate::arithmetic::calculate_percentage_change;
use metareport_core::types::{ComparisonData, MetricTotals, PercentageChange};

/// Period-over-period change of `current` against `previous`. Rates compare
/// the averaged totals (`avg_cpc` → `cpc` and so on).
pub fn compare_metrics(current: &MetricTotals, previous: &MetricTotals) -> ComparisonData {
    ComparisonData {
        previous_totals: *previous,
        percentage_change: PercentageChange {
            impressions: calculate_percentage_change(current.impressions as f64, previous.impressions as f64),
            clicks: calculate_percentage_change(current.clicks as f64, previous.clicks as f64),
            spend: calculate_percentage_change(current.spend, previous.spend),
            cpc: calculate_percentage_change(current.avg_cpc, previous.avg_cpc),
            cpm: calculate_percentage_change(current.avg_cpm, previous.avg_cpm),
            ctr: calculate_percentage_change(current.avg_ctr, previous.avg_ctr),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(impressions: u64, clicks: u64, spend: f64, cpc: f64, cpm: f64, ctr: f64) -> MetricTotals {
        MetricTotals {
            impressions,
            clicks,
            spend,
            avg_cpc: cpc,
            avg_cpm: cpm,
            avg_ctr: ctr,
        }
    }

    #[test]
    fn test_doubled_and_unchanged() {
        let previous = totals(100, 10, 5.0, 0.5, 50.0, 10.0);
        let current = totals(200, 10, 2.5, 0.5, 100.0, 5.0);
        let cmp = compare_metrics(&current, &previous);

        assert_eq!(cmp.previous_totals, previous);
        let pc = cmp.percentage_change;
        assert!((pc.impressions - 100.0).abs() < 1e-9);
        assert!(pc.clicks.abs() < 1e-9);
        assert!((pc.spend + 50.0).abs() < 1e-9);
        assert!(pc.cpc.abs() < 1e-9);
        assert!((pc.cpm - 100.0).abs() < 1e-9);
        assert!((pc.ctr + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_previous_policy() {
        let previous = MetricTotals::default();
        let current = totals(10, 0, 1.0, 0.0, 100.0, 0.0);
        let pc = compare_metrics(&current, &previous).percentage_change;
        assert_eq!(pc.impressions, 100.0);
        assert_eq!(pc.clicks, 0.0);
        assert_eq!(pc.spend, 100.0);
        assert_eq!(pc.cpc, 0.0);
        assert_eq!(pc.cpm, 100.0);
        assert_eq!(pc.ctr, 0.0);
    }

    #[test]
    fn test_decrease_is_negative() {
        let previous = totals(1000, 100, 50.0, 0.5, 50.0, 10.0);
        let current = totals(900, 80, 45.0, 0.5625, 50.0, 8.888);
        let pc = compare_metrics(&current, &previous).percentage_change;
        assert!(pc.impressions < 0.0);
        assert!(pc.clicks < 0.0);
        assert!(pc.spend < 0.0);
        assert!(pc.ctr < 0.0);
        assert!(pc.cpc > 0.0);
    }
}
