//! PDF export: a minimal, uncompressed PDF 1.4 document listing every
//! campaign's metrics followed by the report totals.
//!
//! Each text line sits on its own line of the content stream as
//! `(<escaped text>) Tj T*`, which keeps the document searchable with plain
//! pattern matching. Text is WinAnsi-encoded with octal escapes for bytes
//! outside printable ASCII, so the file itself is pure ASCII. A line holding
//! characters WinAnsi cannot represent is drawn with `?` in their place and
//! wrapped in a marked-content span whose `/ActualText` carries the exact
//! text as UTF-16BE.

use metareport_core::types::ReportData;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const LINES_PER_PAGE: usize = 50;
const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN_LEFT: u32 = 50;
const MARGIN_TOP: u32 = 742;
const FONT_SIZE: u32 = 11;
const LEADING: u32 = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfCampaign {
    pub name: String,
    pub metrics: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfContent {
    pub title: String,
    pub campaigns: Vec<PdfCampaign>,
    pub totals: Vec<(String, f64)>,
}

impl PdfContent {
    /// The document's text, one entry per rendered line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.clone(), String::new()];
        for campaign in &self.campaigns {
            lines.push(format!("Campaign: {}", campaign.name));
            lines.extend(campaign.metrics.iter().map(|(k, v)| format!("  {k}: {v}")));
            lines.push(String::new());
        }
        lines.push("Totals:".to_string());
        lines.extend(self.totals.iter().map(|(k, v)| format!("  {k}: {v}")));
        lines
    }
}

pub fn format_report_to_pdf_content(data: &ReportData, start_date: &str, end_date: &str) -> PdfContent {
    let metric = |k: &str, v: f64| (k.to_string(), v);
    PdfContent {
        title: format!("Report {start_date} - {end_date}"),
        campaigns: data
            .campaigns
            .iter()
            .map(|c| PdfCampaign {
                name: c.campaign_name.clone(),
                metrics: vec![
                    metric("impressions", c.impressions as f64),
                    metric("clicks", c.clicks as f64),
                    metric("cpc", c.cpc),
                    metric("cpm", c.cpm),
                    metric("spend", c.spend),
                    metric("ctr", c.ctr),
                ],
            })
            .collect(),
        totals: vec![
            metric("impressions", data.totals.impressions as f64),
            metric("clicks", data.totals.clicks as f64),
            metric("spend", data.totals.spend),
            metric("avgCpc", data.totals.avg_cpc),
            metric("avgCpm", data.totals.avg_cpm),
            metric("avgCtr", data.totals.avg_ctr),
        ],
    }
}

/// Renders the content as a paginated Helvetica document with a valid
/// cross-reference table.
pub fn generate_pdf_buffer(content: &PdfContent) -> Vec<u8> {
    let lines = content.lines();
    let pages: Vec<&[String]> = lines.chunks(LINES_PER_PAGE).collect();

    let mut doc = PdfWriter::new();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_object_id(i)))
        .collect();

    doc.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    doc.object(
        2,
        &format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()),
    );
    doc.object(
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );

    for (i, page_lines) in pages.iter().enumerate() {
        let page_id = page_object_id(i);
        let stream = content_stream(page_lines);
        doc.object(
            page_id,
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                page_id + 1
            ),
        );
        doc.object(
            page_id + 1,
            &format!("<< /Length {} >>\nstream\n{stream}endstream", stream.len()),
        );
    }

    doc.finish(1)
}

pub fn export_pdf(data: &ReportData, start_date: &str, end_date: &str) -> Vec<u8> {
    generate_pdf_buffer(&format_report_to_pdf_content(data, start_date, end_date))
}

/// Campaign names in document order.
pub fn extract_pdf_campaign_names(buffer: &[u8]) -> Vec<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^(?:/Span << /ActualText <([0-9A-Fa-f]*)> >> BDC )?\(Campaign: ((?:[^\\()]|\\.)*)\) Tj")
            .expect("static pattern")
    });
    let text = String::from_utf8_lossy(buffer);
    re.captures_iter(&text)
        .map(|caps| match caps.get(1) {
            Some(actual) => {
                let line = decode_utf16_hex(actual.as_str());
                line.strip_prefix("Campaign: ").unwrap_or(&line).to_string()
            }
            None => unescape_pdf_string(&caps[2]),
        })
        .collect()
}

/// Every `name: value` metric line in document order, campaigns first and
/// totals last.
pub fn extract_pdf_metric_values(buffer: &[u8]) -> Vec<f64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^\(\s+[A-Za-z]+: (-?[0-9]+(?:\.[0-9]+)?)\) Tj").expect("static pattern")
    });
    let text = String::from_utf8_lossy(buffer);
    re.captures_iter(&text)
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .collect()
}

fn page_object_id(page_index: usize) -> usize {
    4 + page_index * 2
}

fn content_stream(lines: &[String]) -> String {
    let mut stream = format!(
        "BT\n/F1 {FONT_SIZE} Tf\n{LEADING} TL\n{MARGIN_LEFT} {MARGIN_TOP} Td\n"
    );
    for line in lines {
        let (text, exact) = encode_pdf_string(line);
        if exact {
            stream.push_str(&format!("({text}) Tj T*\n"));
        } else {
            stream.push_str(&format!(
                "/Span << /ActualText <{}> >> BDC ({text}) Tj EMC T*\n",
                encode_utf16_hex(line)
            ));
        }
    }
    stream.push_str("ET\n");
    stream
}

/// WinAnsi code points 0x80..=0x9F that differ from Latin-1.
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch as u32 {
        0x00..=0x7F | 0xA0..=0xFF => Some(ch as u8),
        _ => WIN_ANSI_HIGH.iter().find(|(_, c)| *c == ch).map(|(b, _)| *b),
    }
}

fn win_ansi_char(byte: u8) -> char {
    WIN_ANSI_HIGH
        .iter()
        .find(|(b, _)| *b == byte)
        .map(|(_, c)| *c)
        .unwrap_or(byte as char)
}

/// Literal-string body for `s`: backslash, parentheses and line breaks
/// escaped, bytes outside printable ASCII as `\ddd`. The flag is false when
/// some character had no WinAnsi code and was replaced by `?`.
fn encode_pdf_string(s: &str) -> (String, bool) {
    let mut out = String::with_capacity(s.len());
    let mut exact = true;
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ' '..='~' => out.push(ch),
            _ => match win_ansi_byte(ch) {
                Some(b) => out.push_str(&format!("\\{b:03o}")),
                None => {
                    exact = false;
                    out.push('?');
                }
            },
        }
    }
    (out, exact)
}

fn unescape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(d @ '0'..='7') => {
                let mut code = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) => {
                            code = code * 8 + next;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(win_ansi_char((code & 0xFF) as u8));
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn encode_utf16_hex(s: &str) -> String {
    std::iter::once(0xFEFF)
        .chain(s.encode_utf16())
        .map(|unit| format!("{unit:04X}"))
        .collect()
}

fn decode_utf16_hex(hex: &str) -> String {
    let units: Vec<u16> = hex
        .as_bytes()
        .chunks(4)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|chunk| u16::from_str_radix(chunk, 16).ok())
        .collect();
    let units = units.strip_prefix(&[0xFEFF]).unwrap_or(&units);
    String::from_utf16_lossy(units)
}

/// Accumulates numbered objects and records their byte offsets for the
/// cross-reference table.
struct PdfWriter {
    buf: String,
    offsets: Vec<(usize, usize)>,
}

impl PdfWriter {
    fn new() -> Self {
        Self {
            buf: String::from("%PDF-1.4\n"),
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets.push((id, self.buf.len()));
        self.buf.push_str(&format!("{id} 0 obj\n{body}\nendobj\n"));
    }

    fn finish(mut self, root: usize) -> Vec<u8> {
        self.offsets.sort_by_key(|(id, _)| *id);
        let size = self.offsets.len() + 1;
        let xref_offset = self.buf.len();

        self.buf.push_str(&format!("xref\n0 {size}\n0000000000 65535 f \n"));
        for (_, offset) in &self.offsets {
            self.buf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        self.buf.push_str(&format!(
            "trailer\n<< /Size {size} /Root {root} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        ));
        self.buf.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metareport_core::types::{CampaignInsight, MetricTotals};
    use proptest::prelude::*;

    fn campaign(name: &str, impressions: u64, clicks: u64) -> CampaignInsight {
        let mut c = CampaignInsight::new(format!("id-{name}"), name);
        c.impressions = impressions;
        c.clicks = clicks;
        c.spend = 12.5;
        c
    }

    fn report(campaigns: Vec<CampaignInsight>) -> ReportData {
        let impressions = campaigns.iter().map(|c| c.impressions).sum();
        let clicks = campaigns.iter().map(|c| c.clicks).sum();
        ReportData {
            campaigns,
            totals: MetricTotals {
                impressions,
                clicks,
                ..MetricTotals::default()
            },
            comparison: None,
        }
    }

    #[test]
    fn test_document_structure() {
        let pdf = export_pdf(&report(vec![campaign("Launch", 100, 10)]), "2024-01-01", "2024-01-07");
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("(Report 2024-01-01 - 2024-01-07) Tj"));

        // startxref points at the xref keyword
        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(pdf[startxref..].starts_with(b"xref"));
    }

    #[test]
    fn test_contains_every_campaign_and_totals() {
        let data = report(vec![
            campaign("Spring Sale", 1200, 34),
            campaign("Brand (EU)", 900, 7),
            campaign("Back\\slash", 5, 0),
        ]);
        let pdf = export_pdf(&data, "2024-01-01", "2024-01-31");

        let names = extract_pdf_campaign_names(&pdf);
        assert_eq!(names, vec!["Spring Sale", "Brand (EU)", "Back\\slash"]);

        let values = extract_pdf_metric_values(&pdf);
        for c in &data.campaigns {
            assert!(values.contains(&(c.impressions as f64)));
            assert!(values.contains(&(c.clicks as f64)));
        }
        assert!(values.contains(&(data.totals.impressions as f64)));
        assert!(values.contains(&(data.totals.clicks as f64)));
    }

    #[test]
    fn test_name_with_line_break_and_metric_lookalike() {
        let data = report(vec![campaign("Two\nlines", 1, 1), campaign("(x: 999", 2, 2)]);
        let pdf = export_pdf(&data, "2024-01-01", "2024-01-01");

        assert_eq!(extract_pdf_campaign_names(&pdf), vec!["Two\nlines", "(x: 999"]);
        assert!(!extract_pdf_metric_values(&pdf).contains(&999.0));
    }

    #[test]
    fn test_many_campaigns_paginate() {
        let campaigns: Vec<CampaignInsight> = (0..40).map(|i| campaign(&format!("C{i}"), i, 0)).collect();
        let content = format_report_to_pdf_content(&report(campaigns), "2024-01-01", "2024-01-02");
        let pages = content.lines().len().div_ceil(LINES_PER_PAGE);
        assert!(pages > 1);

        let pdf = generate_pdf_buffer(&content);
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains(&format!("/Count {pages}")));
        assert_eq!(extract_pdf_campaign_names(&pdf).len(), 40);
    }

    #[test]
    fn test_empty_report_still_has_totals() {
        let pdf = export_pdf(&report(vec![]), "2024-01-01", "2024-01-01");
        assert!(extract_pdf_campaign_names(&pdf).is_empty());
        assert_eq!(extract_pdf_metric_values(&pdf).len(), 6);
    }

    #[test]
    fn test_latin_names_are_win_ansi_encoded() {
        let data = report(vec![campaign("Promoção – Verão €", 3, 1)]);
        let pdf = export_pdf(&data, "2024-01-01", "2024-01-01");

        assert!(pdf.is_ascii());
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("(Campaign: Promo\\347\\343o \\226 Ver\\343o \\200) Tj T*"));
        assert!(!text.contains("ActualText"));
        assert_eq!(extract_pdf_campaign_names(&pdf), vec!["Promoção – Verão €"]);
    }

    #[test]
    fn test_unencodable_names_carry_actual_text() {
        let data = report(vec![campaign("春 🚀 sale", 8, 2), campaign("Plain", 1, 0)]);
        let pdf = export_pdf(&data, "2024-01-01", "2024-01-01");

        assert!(pdf.is_ascii());
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains("BDC (Campaign: ? ? sale) Tj EMC T*"));
        assert_eq!(extract_pdf_campaign_names(&pdf), vec!["春 🚀 sale", "Plain"]);

        let values = extract_pdf_metric_values(&pdf);
        assert!(values.contains(&8.0));
        assert!(values.contains(&9.0));
    }

    proptest! {
        #[test]
        fn test_every_campaign_and_total_is_extractable(
            specs in prop::collection::vec((any::<String>(), 0u32..1_000_000, 0u32..100_000), 0..30),
        ) {
            let campaigns: Vec<CampaignInsight> = specs
                .iter()
                .map(|(name, impressions, clicks)| {
                    let mut c = CampaignInsight::new("id", name.as_str());
                    c.impressions = u64::from(*impressions);
                    c.clicks = u64::from(*clicks);
                    c
                })
                .collect();
            let data = report(campaigns);
            let pdf = export_pdf(&data, "2024-01-01", "2024-01-31");

            prop_assert!(pdf.is_ascii());
            let names: Vec<String> = specs.iter().map(|(name, _, _)| name.clone()).collect();
            prop_assert_eq!(extract_pdf_campaign_names(&pdf), names);

            let values = extract_pdf_metric_values(&pdf);
            prop_assert_eq!(values.len(), specs.len() * 6 + 6);
            for (_, impressions, clicks) in &specs {
                prop_assert!(values.contains(&f64::from(*impressions)));
                prop_assert!(values.contains(&f64::from(*clicks)));
            }
            prop_assert!(values.contains(&(data.totals.impressions as f64)));
        }
    }
}
