//! Report generation: validate, fetch one or two periods, run the pipeline,
//! persist.

use crate::pipeline::{assemble_report_data, build_period};
use crate::store::ReportStore;
use chrono::{DateTime, Utc};
use metareport_core::types::{MetaAccount, NewReport, RawInsightRow, Report, ReportSummary};
use metareport_core::{validate_date_range, DateRange, ReportError, ReportResult};
use metareport_meta::{InsightsSource, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReportRequest {
    pub owner_id: Uuid,
    /// Id of the connected account record the report belongs to.
    pub meta_account_id: String,
    /// Ad account to pull insights for, with or without the `act_` prefix.
    pub account_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub compare_start_date: Option<String>,
    #[serde(default)]
    pub compare_end_date: Option<String>,
}

impl GenerateReportRequest {
    /// The primary range and, if requested, the comparison range.
    pub fn validate(&self) -> ReportResult<(DateRange, Option<DateRange>)> {
        if self.account_id.trim().is_empty() {
            return Err(ReportError::MissingField("account_id"));
        }
        let range = validate_date_range(&self.start_date, &self.end_date)?;

        let compare = match (&self.compare_start_date, &self.compare_end_date) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(validate_date_range(start, end)?),
            (start, end) => {
                return Err(ReportError::InvalidDateRange {
                    start: start.clone().unwrap_or_default(),
                    end: end.clone().unwrap_or_default(),
                })
            }
        };
        Ok((range, compare))
    }
}

pub struct ReportGenerator {
    source: Arc<dyn InsightsSource>,
    store: Arc<dyn ReportStore>,
    retry: RetryPolicy,
}

impl ReportGenerator {
    pub fn new(source: Arc<dyn InsightsSource>, store: Arc<dyn ReportStore>) -> Self {
        Self {
            source,
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    pub async fn generate(&self, request: GenerateReportRequest) -> ReportResult<Report> {
        let (range, compare) = request.validate()?;
        info!(
            owner_id = %request.owner_id,
            account_id = %request.account_id,
            range = %range,
            compare = compare.is_some(),
            "Generating report"
        );

        let current_rows = self.fetch_period(&request.account_id, &range);
        let previous_rows = async {
            match &compare {
                Some(r) => self.fetch_period(&request.account_id, r).await.map(Some),
                None => Ok(None),
            }
        };
        let (current_rows, previous_rows) = tokio::try_join!(current_rows, previous_rows)?;

        let current = build_period(&current_rows, &range);
        let previous = match (&previous_rows, &compare) {
            (Some(rows), Some(r)) => Some(build_period(rows, r)),
            _ => None,
        };
        let data = assemble_report_data(current, previous.as_ref());

        let report = self
            .store
            .save(NewReport {
                user_id: request.owner_id,
                meta_account_id: request.meta_account_id,
                start_date: range.start,
                end_date: range.end,
                compare_start_date: compare.map(|r| r.start),
                compare_end_date: compare.map(|r| r.end),
                data,
            })
            .await?;

        metrics::counter!("reports.generated").increment(1);
        info!(
            report_id = %report.id,
            campaigns = report.data.campaigns.len(),
            "Report generated"
        );
        Ok(report)
    }

    /// `generate` on behalf of a stored account record. The account must be
    /// connected at `now` and belong to the requesting owner.
    pub async fn generate_for_account(
        &self,
        account: &MetaAccount,
        mut request: GenerateReportRequest,
        now: DateTime<Utc>,
    ) -> ReportResult<Report> {
        if account.user_id != request.owner_id || !account.is_connected(now) {
            warn!(account = %account.id, owner_id = %request.owner_id, "Account not usable for report");
            return Err(ReportError::AccountNotConnected(account.meta_account_id.clone()));
        }
        request.meta_account_id = account.id.to_string();
        if request.account_id.trim().is_empty() {
            request.account_id = account.meta_account_id.clone();
        }
        self.generate(request).await
    }

    pub async fn get_report(&self, id: Uuid, owner_id: Uuid) -> ReportResult<Report> {
        self.store.get_for_owner(id, owner_id).await
    }

    pub async fn list_reports(&self, owner_id: Uuid) -> ReportResult<Vec<ReportSummary>> {
        self.store.list_by_owner(owner_id).await
    }

    async fn fetch_period(&self, account_id: &str, range: &DateRange) -> ReportResult<Vec<RawInsightRow>> {
        let rows = self
            .retry
            .run(|| self.source.fetch_insights(account_id, range))
            .await?;
        debug!(range = %range, rows = rows.len(), "Period fetched");
        Ok(rows)
    }
}
