//! Report persistence seam and its in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use metareport_core::types::{NewReport, Report, ReportSummary};
use metareport_core::{ReportError, ReportResult};
use tracing::{debug, info};
use uuid::Uuid;

/// Keyed report storage. Reports are written once and never updated.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Assigns the id and creation time and returns the stored report.
    async fn save(&self, report: NewReport) -> ReportResult<Report>;

    async fn get_by_id(&self, id: Uuid) -> ReportResult<Report>;

    /// Like `get_by_id`, but a report owned by someone else is `NotFound`.
    async fn get_for_owner(&self, id: Uuid, owner_id: Uuid) -> ReportResult<Report> {
        let report = self.get_by_id(id).await?;
        if report.user_id != owner_id {
            return Err(ReportError::NotFound(id));
        }
        Ok(report)
    }

    /// The owner's report history, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> ReportResult<Vec<ReportSummary>>;
}

/// Thread-safe in-memory report store backed by DashMap.
pub struct InMemoryReportStore {
    reports: DashMap<Uuid, Report>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        info!("Report store initialized (in-memory)");
        Self {
            reports: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl Default for InMemoryReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, report: NewReport) -> ReportResult<Report> {
        let report = Report::from_new(Uuid::new_v4(), report, Utc::now());
        self.reports.insert(report.id, report.clone());
        debug!(report_id = %report.id, user_id = %report.user_id, "Report stored");
        Ok(report)
    }

    async fn get_by_id(&self, id: Uuid) -> ReportResult<Report> {
        self.reports
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(ReportError::NotFound(id))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> ReportResult<Vec<ReportSummary>> {
        let mut summaries: Vec<ReportSummary> = self
            .reports
            .iter()
            .filter(|r| r.value().user_id == owner_id)
            .map(|r| r.value().summary())
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}
