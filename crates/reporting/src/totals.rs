use crate::arithmetic::derive_rates;
use metareport_core::types::{CampaignInsight, MetricTotals};

/// Report-wide sums with volume-weighted averages derived from the sums,
/// not averaged from per-campaign rates.
pub fn calculate_totals(campaigns: &[CampaignInsight]) -> MetricTotals {
    let (impressions, clicks, spend) = campaigns.iter().fold((0u64, 0u64, 0.0f64), |acc, c| {
        (
            acc.0.saturating_add(c.impressions),
            acc.1.saturating_add(c.clicks),
            acc.2 + c.spend,
        )
    });
    let rates = derive_rates(impressions, clicks, spend);

    MetricTotals {
        impressions,
        clicks,
        spend,
        avg_cpc: rates.cpc,
        avg_cpm: rates.cpm,
        avg_ctr: rates.ctr,
    }
}
