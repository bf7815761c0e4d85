//! Raw insight rows → one `CampaignInsight` per campaign with a daily series.

use crate::arithmetic::{derive_rates, parse_count_or_zero, parse_metric_or_zero};
use crate::consolidator::CampaignIndex;
use metareport_core::date_range::parse_iso_date;
use metareport_core::types::{CampaignInsight, DailyMetric, RawInsightRow};

/// The row's own day, metrics parsed leniently and taken as delivered.
pub fn daily_metric_from_row(row: &RawInsightRow) -> DailyMetric {
    DailyMetric {
        date: row.date_start.clone(),
        impressions: parse_count_or_zero(row.impressions.as_deref()),
        clicks: parse_count_or_zero(row.clicks.as_deref()),
        cpc: parse_metric_or_zero(row.cpc.as_deref()),
        cpm: parse_metric_or_zero(row.cpm.as_deref()),
        spend: parse_metric_or_zero(row.spend.as_deref()),
        ctr: parse_metric_or_zero(row.ctr.as_deref()),
    }
}

fn has_valid_day(row: &RawInsightRow) -> bool {
    parse_iso_date(&row.date_start).is_some()
}

/// Recompute `cpc`, `cpm` and `ctr` from the campaign's sums.
pub fn apply_derived_rates(campaign: &mut CampaignInsight) {
    let rates = derive_rates(campaign.impressions, campaign.clicks, campaign.spend);
    campaign.cpc = rates.cpc;
    campaign.cpm = rates.cpm;
    campaign.ctr = rates.ctr;
}

/// Groups rows by campaign id in first-seen order. Each row becomes one
/// daily entry; the campaign's impressions, clicks and spend are the sums
/// of its rows and its rates are derived from those sums.
///
/// A row without a valid `YYYY-MM-DD` day still counts toward the campaign
/// sums but gets no daily entry, so every series date is a real day.
pub fn normalize_insights(rows: &[RawInsightRow]) -> Vec<CampaignInsight> {
    let mut index = CampaignIndex::new();

    for row in rows {
        let daily = daily_metric_from_row(row);
        let campaign = index.get_or_insert_with(&row.campaign_id, || {
            CampaignInsight::new(row.campaign_id.clone(), row.campaign_name.clone())
        });
        campaign.impressions = campaign.impressions.saturating_add(daily.impressions);
        campaign.clicks = campaign.clicks.saturating_add(daily.clicks);
        campaign.spend += daily.spend;
        if has_valid_day(row) {
            campaign.daily_breakdown.push(daily);
        }
    }

    let mut campaigns = index.into_vec();
    for campaign in &mut campaigns {
        apply_derived_rates(campaign);
    }
    campaigns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, day: &str, impressions: &str, clicks: &str, spend: &str) -> RawInsightRow {
        RawInsightRow {
            campaign_id: id.into(),
            campaign_name: format!("Campaign {id}"),
            impressions: Some(impressions.into()),
            clicks: Some(clicks.into()),
            cpc: Some("9.99".into()),
            cpm: Some("9.99".into()),
            spend: Some(spend.into()),
            ctr: Some("9.99".into()),
            date_start: day.into(),
            date_stop: day.into(),
        }
    }

    #[test]
    fn test_two_days_one_campaign() {
        let rows = vec![
            row("c1", "2024-01-01", "100", "10", "5"),
            row("c1", "2024-01-02", "200", "30", "15"),
        ];
        let out = normalize_insights(&rows);
        assert_eq!(out.len(), 1);

        let c1 = &out[0];
        assert_eq!(c1.impressions, 300);
        assert_eq!(c1.clicks, 40);
        assert!((c1.spend - 20.0).abs() < 1e-9);
        assert!((c1.ctr - 13.333_333_333).abs() < 1e-6);
        assert!((c1.cpm - 66.666_666_666).abs() < 1e-6);
        assert!((c1.cpc - 0.5).abs() < 1e-9);
        assert_eq!(c1.daily_breakdown.len(), 2);
    }

    #[test]
    fn test_daily_rates_kept_as_delivered() {
        let out = normalize_insights(&[row("c1", "2024-01-01", "100", "10", "5")]);
        let day = &out[0].daily_breakdown[0];
        assert_eq!(day.cpc, 9.99);
        assert_eq!(day.date, "2024-01-01");
        // top-level rates never come from the raw row
        assert!((out[0].cpc - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_first_seen_order_and_interleaving() {
        let rows = vec![
            row("b", "2024-01-01", "1", "0", "0"),
            row("a", "2024-01-01", "2", "0", "0"),
            row("b", "2024-01-02", "3", "0", "0"),
        ];
        let out = normalize_insights(&rows);
        assert_eq!(out[0].campaign_id, "b");
        assert_eq!(out[0].impressions, 4);
        assert_eq!(out[1].campaign_id, "a");
    }

    #[test]
    fn test_malformed_numbers_become_zero() {
        let mut bad = row("c1", "2024-01-01", "lots", "", "free");
        bad.ctr = None;
        let out = normalize_insights(&[bad]);
        let c1 = &out[0];
        assert_eq!((c1.impressions, c1.clicks, c1.spend), (0, 0, 0.0));
        assert_eq!((c1.cpc, c1.cpm, c1.ctr), (0.0, 0.0, 0.0));
        assert_eq!(c1.daily_breakdown[0].ctr, 0.0);
    }

    #[test]
    fn test_empty_rows() {
        assert!(normalize_insights(&[]).is_empty());
    }

    #[test]
    fn test_row_without_day_counts_but_adds_no_daily_entry() {
        let mut dateless = row("c1", "", "50", "5", "2");
        dateless.date_stop = String::new();
        let short = row("c1", "2024-1-2", "1", "0", "0");
        let rows = vec![row("c1", "2024-01-01", "100", "10", "5"), dateless, short];
        let out = normalize_insights(&rows);

        assert_eq!(out[0].impressions, 151);
        assert_eq!(out[0].daily_breakdown.len(), 1);
        assert_eq!(out[0].daily_breakdown[0].date, "2024-01-01");
    }
}
