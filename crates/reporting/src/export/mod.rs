//! On-demand export of stored reports. Artifacts are generated from the
//! report's data each time and never persisted.

pub mod csv_export;
pub mod pdf;

pub use csv_export::{
    export_csv, format_report_to_csv_rows, generate_csv_string, parse_csv_string, CsvRow, CSV_HEADERS,
};
pub use pdf::{
    export_pdf, extract_pdf_campaign_names, extract_pdf_metric_values, format_report_to_pdf_content,
    generate_pdf_buffer, PdfCampaign, PdfContent,
};

use metareport_core::date_range::DATE_FORMAT;
use metareport_core::types::Report;
use metareport_core::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    pub fn file_name(&self, report_id: Uuid) -> String {
        format!("report-{report_id}.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            other => Err(ReportError::Export(format!("Unsupported export format: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn export_report(report: &Report, format: ExportFormat) -> ReportResult<ExportArtifact> {
    let bytes = match format {
        ExportFormat::Csv => export_csv(&report.data)?.into_bytes(),
        ExportFormat::Pdf => export_pdf(
            &report.data,
            &report.start_date.format(DATE_FORMAT).to_string(),
            &report.end_date.format(DATE_FORMAT).to_string(),
        ),
    };
    debug!(report_id = %report.id, format = %format, bytes = bytes.len(), "Report exported");

    Ok(ExportArtifact {
        file_name: format.file_name(report.id),
        content_type: format.content_type(),
        bytes,
    })
}
