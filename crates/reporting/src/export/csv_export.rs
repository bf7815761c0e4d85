//! CSV export: one row per campaign under a fixed 8-column header.

use crate::arithmetic::{parse_count_or_zero, parse_metric_or_zero};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use metareport_core::types::ReportData;
use metareport_core::{ReportError, ReportResult};
use serde::{Deserialize, Serialize};

pub const CSV_HEADERS: [&str; 8] = [
    "Campaign ID",
    "Campaign Name",
    "Impressions",
    "Clicks",
    "CPC",
    "CPM",
    "Spend",
    "CTR",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvRow {
    pub campaign_id: String,
    pub campaign_name: String,
    pub impressions: u64,
    pub clicks: u64,
    pub cpc: f64,
    pub cpm: f64,
    pub spend: f64,
    pub ctr: f64,
}

pub fn format_report_to_csv_rows(data: &ReportData) -> Vec<CsvRow> {
    data.campaigns
        .iter()
        .map(|c| CsvRow {
            campaign_id: c.campaign_id.clone(),
            campaign_name: c.campaign_name.clone(),
            impressions: c.impressions,
            clicks: c.clicks,
            cpc: c.cpc,
            cpm: c.cpm,
            spend: c.spend,
            ctr: c.ctr,
        })
        .collect()
}

/// Header plus one line per row. Fields holding a comma, quote or line
/// break are quoted with inner quotes doubled.
pub fn generate_csv_string(rows: &[CsvRow]) -> ReportResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.campaign_id.clone(),
                row.campaign_name.clone(),
                row.impressions.to_string(),
                row.clicks.to_string(),
                row.cpc.to_string(),
                row.cpm.to_string(),
                row.spend.to_string(),
                row.ctr.to_string(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Export(e.to_string()))
}

/// Inverse of `generate_csv_string`. The first line is taken as the header;
/// short rows and unparseable numbers read as empty text and `0`.
pub fn parse_csv_string(input: &str) -> ReportResult<Vec<CsvRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let text = |i: usize| record.get(i).unwrap_or_default().to_string();
        rows.push(CsvRow {
            campaign_id: text(0),
            campaign_name: text(1),
            impressions: parse_count_or_zero(record.get(2)),
            clicks: parse_count_or_zero(record.get(3)),
            cpc: parse_metric_or_zero(record.get(4)),
            cpm: parse_metric_or_zero(record.get(5)),
            spend: parse_metric_or_zero(record.get(6)),
            ctr: parse_metric_or_zero(record.get(7)),
        });
    }
    Ok(rows)
}

pub fn export_csv(data: &ReportData) -> ReportResult<String> {
    generate_csv_string(&format_report_to_csv_rows(data))
}

fn csv_error(e: csv::Error) -> ReportError {
    ReportError::Export(format!("CSV: {e}"))
}
