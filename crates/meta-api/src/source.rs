//! The upstream fetch seam and its TTL-cached decorator.

use crate::models::normalize_account_id;
use async_trait::async_trait;
use metareport_cache::TtlCache;
use metareport_core::types::RawInsightRow;
use metareport_core::{DateRange, MetaApiError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Anything that can produce raw daily insight rows for an ad account.
#[async_trait]
pub trait InsightsSource: Send + Sync {
    async fn fetch_insights(
        &self,
        account_id: &str,
        range: &DateRange,
    ) -> Result<Vec<RawInsightRow>, MetaApiError>;
}

#[async_trait]
impl<T: InsightsSource + ?Sized> InsightsSource for Arc<T> {
    async fn fetch_insights(
        &self,
        account_id: &str,
        range: &DateRange,
    ) -> Result<Vec<RawInsightRow>, MetaApiError> {
        (**self).fetch_insights(account_id, range).await
    }
}

/// Serves repeated requests with identical parameters from a shared cache
/// until the entry's TTL lapses. Errors are never cached.
pub struct CachedInsightsSource<S> {
    inner: S,
    cache: Arc<TtlCache<Vec<RawInsightRow>>>,
    ttl: Duration,
}

impl<S: InsightsSource> CachedInsightsSource<S> {
    pub fn new(inner: S, cache: Arc<TtlCache<Vec<RawInsightRow>>>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    pub fn cache_key(account_id: &str, range: &DateRange) -> String {
        format!(
            "insights:{}:{}:{}",
            normalize_account_id(account_id),
            range.start_str(),
            range.end_str()
        )
    }

    /// Drop every cached range of one account.
    pub fn invalidate_account(&self, account_id: &str) -> usize {
        self.cache
            .invalidate(&format!("insights:{}:*", normalize_account_id(account_id)))
    }
}

#[async_trait]
impl<S: InsightsSource> InsightsSource for CachedInsightsSource<S> {
    async fn fetch_insights(
        &self,
        account_id: &str,
        range: &DateRange,
    ) -> Result<Vec<RawInsightRow>, MetaApiError> {
        let key = Self::cache_key(account_id, range);
        if let Some(rows) = self.cache.get(&key) {
            debug!(key = %key, rows = rows.len(), "Insights served from cache");
            return Ok(rows);
        }

        let rows = self.inner.fetch_insights(account_id, range).await?;
        self.cache.set(key, rows.clone(), self.ttl);
        Ok(rows)
    }
}
