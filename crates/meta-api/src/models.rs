//! Graph API payload shapes.

use metareport_core::DateRange;
use serde::{Deserialize, Serialize};

/// Fields requested for campaign-level insights.
pub const INSIGHT_FIELDS: &str = "campaign_id,campaign_name,impressions,clicks,cpc,cpm,spend,ctr";
pub const AD_ACCOUNT_FIELDS: &str = "id,name,currency,timezone_name";
pub const CAMPAIGN_FIELDS: &str = "id,name,status,objective";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub since: String,
    pub until: String,
}

pub fn build_insights_time_range(range: &DateRange) -> TimeRange {
    TimeRange {
        since: range.start_str(),
        until: range.end_str(),
    }
}

/// Strips the `act_` prefix so ids from either form address the same account.
pub fn normalize_account_id(account_id: &str) -> &str {
    account_id.strip_prefix("act_").unwrap_or(account_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdAccount {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default, alias = "timezone_name")]
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub objective: String,
}

/// One page of a Graph API collection.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorEnvelope {
    pub error: GraphErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use metareport_core::validate_date_range;

    #[test]
    fn test_time_range_mirrors_dates() {
        let range = validate_date_range("2024-03-01", "2024-03-15").unwrap();
        let tr = build_insights_time_range(&range);
        assert_eq!(tr.since, "2024-03-01");
        assert_eq!(tr.until, "2024-03-15");
        assert_eq!(
            serde_json::to_string(&tr).unwrap(),
            r#"{"since":"2024-03-01","until":"2024-03-15"}"#
        );
    }

    #[test]
    fn test_normalize_account_id() {
        assert_eq!(normalize_account_id("act_123"), "123");
        assert_eq!(normalize_account_id("123"), "123");
    }

    #[test]
    fn test_ad_account_reads_timezone_name() {
        let account: AdAccount = serde_json::from_value(serde_json::json!({
            "id": "act_1", "name": "Shop", "currency": "BRL", "timezone_name": "America/Sao_Paulo"
        }))
        .unwrap();
        assert_eq!(account.timezone, "America/Sao_Paulo");
    }
}
