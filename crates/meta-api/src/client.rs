//! Graph API HTTP client.

use crate::models::{
    build_insights_time_range, normalize_account_id, AdAccount, CampaignSummary, GraphErrorEnvelope,
    GraphPage, AD_ACCOUNT_FIELDS, CAMPAIGN_FIELDS, INSIGHT_FIELDS,
};
use crate::source::InsightsSource;
use async_trait::async_trait;
use metareport_core::config::MetaConfig;
use metareport_core::types::RawInsightRow;
use metareport_core::{DateRange, MetaApiError};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Read-only client for the endpoints the report pipeline needs.
pub struct GraphApiClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    access_token: String,
    page_limit: u32,
}

impl GraphApiClient {
    pub fn new(config: &MetaConfig, access_token: impl Into<String>) -> Result<Self, MetaApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| MetaApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.graph_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            access_token: access_token.into(),
            page_limit: config.page_limit,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_version, path)
    }

    /// Accounts the token's user can read.
    pub async fn fetch_ad_accounts(&self) -> Result<Vec<AdAccount>, MetaApiError> {
        let url = self.endpoint("me/adaccounts");
        self.get_all(&url, vec![("fields", AD_ACCOUNT_FIELDS.to_string())])
            .await
    }

    pub async fn fetch_campaigns(&self, account_id: &str) -> Result<Vec<CampaignSummary>, MetaApiError> {
        let url = self.endpoint(&format!("act_{}/campaigns", normalize_account_id(account_id)));
        self.get_all(&url, vec![("fields", CAMPAIGN_FIELDS.to_string())])
            .await
    }

    /// Campaign-level insights, one row per campaign per day.
    pub async fn fetch_insight_rows(
        &self,
        account_id: &str,
        range: &DateRange,
    ) -> Result<Vec<RawInsightRow>, MetaApiError> {
        let url = self.endpoint(&format!("act_{}/insights", normalize_account_id(account_id)));
        let time_range = serde_json::to_string(&build_insights_time_range(range))
            .map_err(|e| MetaApiError::Decode(e.to_string()))?;

        info!(account_id = account_id, range = %range, "Fetching insights");
        metrics::counter!("meta.insights.fetch").increment(1);

        let rows: Vec<RawInsightRow> = self
            .get_all(
                &url,
                vec![
                    ("fields", INSIGHT_FIELDS.to_string()),
                    ("time_range", time_range),
                    ("level", "campaign".to_string()),
                    ("time_increment", "1".to_string()),
                ],
            )
            .await?;

        info!(account_id = account_id, rows = rows.len(), "Insights fetched");
        Ok(rows)
    }

    /// Fetch a collection, following `paging.next` until exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<Vec<T>, MetaApiError> {
        query.push(("limit", self.page_limit.to_string()));
        query.push(("access_token", self.access_token.clone()));

        let mut page: GraphPage<T> = self.get_json(self.http.get(url).query(&query)).await?;
        let mut items = std::mem::take(&mut page.data);

        while let Some(next) = page.paging.and_then(|p| p.next) {
            debug!(fetched = items.len(), "Following Graph API cursor");
            // `next` already carries every query parameter
            page = self.get_json(self.http.get(&next)).await?;
            items.append(&mut page.data);
        }

        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, MetaApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| MetaApiError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MetaApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<GraphErrorEnvelope>(&body) {
                Ok(envelope) => MetaApiError::Api {
                    code: envelope.error.code,
                    message: envelope.error.message,
                    error_type: envelope.error.error_type,
                    fbtrace_id: envelope.error.fbtrace_id,
                },
                Err(_) => MetaApiError::Transport(format!("HTTP {status}")),
            });
        }

        serde_json::from_str(&body).map_err(|e| MetaApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl InsightsSource for GraphApiClient {
    async fn fetch_insights(
        &self,
        account_id: &str,
        range: &DateRange,
    ) -> Result<Vec<RawInsightRow>, MetaApiError> {
        self.fetch_insight_rows(account_id, range).await
    }
}
