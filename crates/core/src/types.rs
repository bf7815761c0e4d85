use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ─── Raw upstream rows ──────────────────────────────────────────────────────

/// One insight row as delivered by the ad-data API: a campaign on a single
/// day with string-encoded metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInsightRow {
    pub campaign_id: String,
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub impressions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub clicks: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cpc: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cpm: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub spend: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ctr: Option<String>,
    #[serde(default)]
    pub date_start: String,
    #[serde(default)]
    pub date_stop: String,
}

/// The API encodes numbers as strings but occasionally sends bare numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ─── Report data ────────────────────────────────────────────────────────────

/// Metrics for one campaign on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetric {
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub impressions: u64,
    pub clicks: u64,
    pub cpc: f64,
    pub cpm: f64,
    pub spend: f64,
    pub ctr: f64,
}

impl DailyMetric {
    pub fn zero(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            impressions: 0,
            clicks: 0,
            cpc: 0.0,
            cpm: 0.0,
            spend: 0.0,
            ctr: 0.0,
        }
    }
}

/// Aggregated performance of a single campaign over the report period.
///
/// `cpc`, `cpm` and `ctr` are derived from `impressions`, `clicks` and
/// `spend`; they are recomputed whenever those change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInsight {
    pub campaign_id: String,
    pub campaign_name: String,
    pub impressions: u64,
    pub clicks: u64,
    pub cpc: f64,
    pub cpm: f64,
    pub spend: f64,
    pub ctr: f64,
    #[serde(default)]
    pub daily_breakdown: Vec<DailyMetric>,
}

impl CampaignInsight {
    pub fn new(campaign_id: impl Into<String>, campaign_name: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            campaign_name: campaign_name.into(),
            impressions: 0,
            clicks: 0,
            cpc: 0.0,
            cpm: 0.0,
            spend: 0.0,
            ctr: 0.0,
            daily_breakdown: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTotals {
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub avg_cpc: f64,
    pub avg_cpm: f64,
    pub avg_ctr: f64,
}

/// Signed percentage change per metric between two periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentageChange {
    pub impressions: f64,
    pub clicks: f64,
    pub spend: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub ctr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonData {
    pub previous_totals: MetricTotals,
    pub percentage_change: PercentageChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub campaigns: Vec<CampaignInsight>,
    pub totals: MetricTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonData>,
}

// ─── Persisted reports ──────────────────────────────────────────────────────

/// A report ready to be persisted. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub user_id: Uuid,
    pub meta_account_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub compare_start_date: Option<NaiveDate>,
    pub compare_end_date: Option<NaiveDate>,
    pub data: ReportData,
}

/// Stored report. Created once at generation time and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meta_account_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub compare_start_date: Option<NaiveDate>,
    pub compare_end_date: Option<NaiveDate>,
    pub data: ReportData,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn from_new(id: Uuid, report: NewReport, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: report.user_id,
            meta_account_id: report.meta_account_id,
            start_date: report.start_date,
            end_date: report.end_date,
            compare_start_date: report.compare_start_date,
            compare_end_date: report.compare_end_date,
            data: report.data,
            created_at,
        }
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id,
            start_date: self.start_date,
            end_date: self.end_date,
            compare_start_date: self.compare_start_date,
            compare_end_date: self.compare_end_date,
            created_at: self.created_at,
        }
    }
}

/// Row of the report history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub compare_start_date: Option<NaiveDate>,
    pub compare_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

// ─── Connected ad accounts ──────────────────────────────────────────────────

/// A user's connected Meta account. The token is stored encrypted by the
/// credential store and never decrypted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meta_account_id: String,
    pub name: String,
    pub access_token_encrypted: String,
    pub token_expiration: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MetaAccount {
    /// Connected means a stored token whose expiration lies in the future.
    pub fn is_connected(&self, now: DateTime<Utc>) -> bool {
        if self.access_token_encrypted.is_empty() {
            return false;
        }
        self.token_expiration.is_some_and(|exp| exp > now)
    }
}
