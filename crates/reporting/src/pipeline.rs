//! Pure composition of the report stages for one or two periods.

use crate::comparison::compare_metrics;
use crate::consolidator::consolidate_by_campaign;
use crate::daily::ensure_daily_breakdown;
use crate::normalizer::normalize_insights;
use crate::totals::calculate_totals;
use metareport_core::types::{CampaignInsight, MetricTotals, RawInsightRow, ReportData};
use metareport_core::DateRange;

/// Campaigns and totals of a single period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    pub range: DateRange,
    pub campaigns: Vec<CampaignInsight>,
    pub totals: MetricTotals,
}

/// normalize → consolidate → complete daily series → total.
pub fn build_period(rows: &[RawInsightRow], range: &DateRange) -> PeriodReport {
    let campaigns: Vec<CampaignInsight> = consolidate_by_campaign(normalize_insights(rows))
        .into_iter()
        .map(|mut campaign| {
            campaign.daily_breakdown = ensure_daily_breakdown(&campaign.daily_breakdown, range);
            campaign
        })
        .collect();
    let totals = calculate_totals(&campaigns);

    PeriodReport {
        range: *range,
        campaigns,
        totals,
    }
}

/// Report body for `current`, compared against `previous` when given.
pub fn assemble_report_data(current: PeriodReport, previous: Option<&PeriodReport>) -> ReportData {
    let comparison = previous.map(|prev| compare_metrics(&current.totals, &prev.totals));
    ReportData {
        campaigns: current.campaigns,
        totals: current.totals,
        comparison,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metareport_core::validate_date_range;

    fn row(id: &str, day: &str, impressions: u64, clicks: u64, spend: f64) -> RawInsightRow {
        RawInsightRow {
            campaign_id: id.into(),
            campaign_name: format!("Campaign {id}"),
            impressions: Some(impressions.to_string()),
            clicks: Some(clicks.to_string()),
            spend: Some(spend.to_string()),
            date_start: day.into(),
            date_stop: day.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_period_completes_every_campaign() {
        let range = validate_date_range("2024-01-01", "2024-01-07").unwrap();
        let rows = vec![
            row("c1", "2024-01-01", 100, 10, 5.0),
            row("c2", "2024-01-03", 300, 40, 20.0),
            row("c1", "2024-01-02", 200, 30, 15.0),
        ];
        let period = build_period(&rows, &range);

        assert_eq!(period.campaigns.len(), 2);
        for campaign in &period.campaigns {
            assert_eq!(campaign.daily_breakdown.len(), 7);
            assert_eq!(campaign.daily_breakdown[0].date, "2024-01-01");
            assert_eq!(campaign.daily_breakdown[6].date, "2024-01-07");
        }
        assert_eq!(period.totals.impressions, 600);
        assert_eq!(period.totals.clicks, 80);
        assert!((period.totals.spend - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_assemble_with_and_without_comparison() {
        let range = validate_date_range("2024-01-08", "2024-01-14").unwrap();
        let prev_range = validate_date_range("2024-01-01", "2024-01-07").unwrap();
        let current = build_period(&[row("c1", "2024-01-08", 200, 20, 10.0)], &range);
        let previous = build_period(&[row("c1", "2024-01-01", 100, 20, 10.0)], &prev_range);

        let plain = assemble_report_data(current.clone(), None);
        assert!(plain.comparison.is_none());
        assert_eq!(plain.totals, current.totals);

        let compared = assemble_report_data(current, Some(&previous));
        let cmp = compared.comparison.unwrap();
        assert_eq!(cmp.previous_totals, previous.totals);
        assert!((cmp.percentage_change.impressions - 100.0).abs() < 1e-9);
        assert!(cmp.percentage_change.clicks.abs() < 1e-9);
    }

    #[test]
    fn test_empty_period() {
        let range = validate_date_range("2024-01-01", "2024-01-02").unwrap();
        let period = build_period(&[], &range);
        assert!(period.campaigns.is_empty());
        assert_eq!(period.totals, MetricTotals::default());
    }
}
