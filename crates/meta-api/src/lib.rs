//! Meta Graph API access — insight fetching, rate-limit retry with
//! exponential backoff, and a TTL-cached insight source.

#![warn(clippy::unwrap_used)]

pub mod client;
pub mod errors;
pub mod models;
pub mod retry;
pub mod source;

pub use client::GraphApiClient;
pub use errors::user_message;
pub use models::{build_insights_time_range, normalize_account_id, AdAccount, CampaignSummary, TimeRange};
pub use retry::{calculate_backoff_delay, retry_with_backoff, retry_with_predicate, RetryOptions, RetryPolicy};
pub use source::{CachedInsightsSource, InsightsSource};
