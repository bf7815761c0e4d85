use thiserror::Error;
use uuid::Uuid;

pub type ReportResult<T> = Result<T, ReportError>;

/// Numeric error codes returned by the Graph API.
pub mod codes {
    pub const RATE_LIMIT: i64 = 4;
    pub const INVALID_PARAMETER: i64 = 100;
    pub const INVALID_TOKEN: i64 = 190;
    pub const PERMISSION_DENIED: i64 = 200;
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid date range: {start} .. {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Upstream API error: {0}")]
    Upstream(#[from] MetaApiError),

    #[error("Report not found: {0}")]
    NotFound(Uuid),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Meta account {0} is not connected or its token has expired")]
    AccountNotConnected(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error surfaced by the upstream ad-data provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetaApiError {
    #[error("Meta API error {code}: {message}")]
    Api {
        code: i64,
        message: String,
        error_type: Option<String>,
        fbtrace_id: Option<String>,
    },

    #[error("Meta API transport error: {0}")]
    Transport(String),

    #[error("Meta API response could not be decoded: {0}")]
    Decode(String),
}

impl MetaApiError {
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
            error_type: None,
            fbtrace_id: None,
        }
    }

    /// Provider error code, if the provider answered with one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        self.code() == Some(codes::RATE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_only_for_api_errors() {
        assert_eq!(MetaApiError::api(190, "expired").code(), Some(190));
        assert_eq!(MetaApiError::Transport("reset".into()).code(), None);
        assert_eq!(MetaApiError::Decode("eof".into()).code(), None);
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(MetaApiError::api(codes::RATE_LIMIT, "slow down").is_rate_limit());
        assert!(!MetaApiError::api(codes::INVALID_PARAMETER, "bad").is_rate_limit());
    }

    #[test]
    fn test_upstream_converts_into_report_error() {
        let err: ReportError = MetaApiError::api(200, "denied").into();
        assert!(matches!(err, ReportError::Upstream(ref e) if e.code() == Some(200)));
        assert_eq!(err.to_string(), "Upstream API error: Meta API error 200: denied");
    }
}
