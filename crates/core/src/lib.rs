pub mod config;
pub mod date_range;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use date_range::{validate_date_range, DateRange};
pub use error::{MetaApiError, ReportError, ReportResult};
