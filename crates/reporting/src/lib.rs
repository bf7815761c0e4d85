//! Report generation pipeline: normalization, consolidation, daily
//! gap-filling, totals and period comparison, plus persistence and export.

pub mod arithmetic;
pub mod comparison;
pub mod consolidator;
pub mod daily;
pub mod export;
pub mod generator;
pub mod normalizer;
pub mod pipeline;
pub mod store;
pub mod totals;

pub use arithmetic::{calculate_percentage_change, derive_rates, parse_count_or_zero, parse_metric_or_zero};
pub use comparison::compare_metrics;
pub use consolidator::consolidate_by_campaign;
pub use daily::{ensure_daily_breakdown, generate_date_sequence};
pub use export::{export_report, ExportArtifact, ExportFormat};
pub use generator::{GenerateReportRequest, ReportGenerator};
pub use normalizer::normalize_insights;
pub use pipeline::{assemble_report_data, build_period, PeriodReport};
pub use store::{InMemoryReportStore, ReportStore};
pub use totals::calculate_totals;
