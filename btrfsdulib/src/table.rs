//! Table-ready report data and plain-text rendering.
//!
//! `ReportTable` turns a joined [`Report`] into display strings and keeps the
//! column widths needed to align them. Rendering is pure string building; the
//! caller decides where the text goes.

use serde::{Deserialize, Serialize};

use crate::report::{Report, ReportEntry};
use crate::size::{human_limit, human_size, MAGNITUDE_WIDTH};

pub const ID_HEADER: &str = "ID";
pub const NAME_HEADER: &str = "Subvolume name";
pub const USED_HEADER: &str = "Used";
pub const USED_LIMIT_HEADER: &str = "Used limit";
pub const EXCLUSIVE_HEADER: &str = "Exclusive";
pub const EXCLUSIVE_LIMIT_HEADER: &str = "Excl. limit";

/// Gap between two columns.
const SEPARATOR: &str = "  ";

/// Label of the summary row; the gap keeps it clear of the value.
const SUM_LABEL: &str = "Sum:    ";

/// A single formatted subvolume row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: String,
    pub name: String,
    /// Referenced bytes, padded to the magnitude width
    pub used: String,
    /// Referenced limit and how much of it is used
    pub used_limit: String,
    /// Exclusive bytes, padded to the magnitude width
    pub exclusive: String,
    /// Exclusive limit and how much of it is used
    pub exclusive_limit: String,
}

impl ReportRow {
    pub fn from_entry(entry: &ReportEntry) -> Self {
        let quota = &entry.quota;
        ReportRow {
            id: entry.subvolume.id.clone(),
            name: entry.subvolume.name.clone(),
            used: human_size(quota.referenced, true),
            used_limit: human_limit(quota.max_referenced, quota.referenced),
            exclusive: human_size(quota.exclusive, true),
            exclusive_limit: human_limit(quota.max_exclusive, quota.exclusive),
        }
    }
}

/// Widths of the content-sized columns.
///
/// Starts at the header widths and grows with every observed row. The two
/// magnitude columns are always [`MAGNITUDE_WIDTH`] wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWidths {
    pub id: usize,
    pub name: usize,
    pub used_limit: usize,
    pub exclusive_limit: usize,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnWidths {
    /// Minimum widths, one per header.
    pub fn new() -> Self {
        Self {
            id: text_width(ID_HEADER),
            name: text_width(NAME_HEADER),
            used_limit: text_width(USED_LIMIT_HEADER),
            exclusive_limit: text_width(EXCLUSIVE_LIMIT_HEADER),
        }
    }

    /// Widen columns to fit a row.
    pub fn observe(&mut self, row: &ReportRow) {
        self.id = self.id.max(text_width(&row.id));
        self.name = self.name.max(text_width(&row.name));
        self.used_limit = self.used_limit.max(text_width(&row.used_limit));
        self.exclusive_limit = self.exclusive_limit.max(text_width(&row.exclusive_limit));
    }

    /// Offset just past the exclusive column.
    fn exclusive_end(&self) -> usize {
        self.id + self.name + MAGNITUDE_WIDTH + self.used_limit + MAGNITUDE_WIDTH
            + 4 * SEPARATOR.len()
    }

    /// Width of a full table line.
    pub fn line_width(&self) -> usize {
        self.exclusive_end() + SEPARATOR.len() + self.exclusive_limit
    }
}

fn text_width(text: &str) -> usize {
    text.chars().count()
}

/// Report data ready for display: title, rows, widths and the summary value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    /// Rows in subvolume list order
    pub rows: Vec<ReportRow>,
    pub widths: ColumnWidths,
    /// Padded total of exclusive bytes
    pub total: String,
}

impl ReportTable {
    /// Format a report and size its columns.
    pub fn from_report(report: &Report) -> Self {
        let rows: Vec<ReportRow> = report.entries.iter().map(ReportRow::from_entry).collect();
        let widths = rows.iter().fold(ColumnWidths::new(), |mut widths, row| {
            widths.observe(row);
            widths
        });

        ReportTable {
            title: format!("Subvolume usage on '{}':", report.path),
            rows,
            widths,
            total: human_size(report.total_exclusive, true),
        }
    }

    pub fn header_line(&self) -> String {
        self.line(
            ID_HEADER,
            NAME_HEADER,
            USED_HEADER,
            USED_LIMIT_HEADER,
            EXCLUSIVE_HEADER,
            EXCLUSIVE_LIMIT_HEADER,
        )
    }

    pub fn ruler(&self) -> String {
        "-".repeat(self.widths.line_width())
    }

    pub fn row_line(&self, row: &ReportRow) -> String {
        self.line(
            &row.id,
            &row.name,
            &row.used,
            &row.used_limit,
            &row.exclusive,
            &row.exclusive_limit,
        )
    }

    /// The summary, right-aligned so its value sits under the exclusive column.
    pub fn summary_line(&self) -> String {
        format!(
            "{:>width$}",
            format!("{}{}", SUM_LABEL, self.total),
            width = self.widths.exclusive_end()
        )
    }

    /// Everything below the title, one line per row plus rulers and summary.
    pub fn render_body(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header_line());
        out.push('\n');
        out.push_str(&self.ruler());
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.row_line(row));
            out.push('\n');
        }
        out.push_str(&self.ruler());
        out.push('\n');
        out.push_str(&self.summary_line());
        out.push('\n');
        out
    }

    /// The whole report as plain text.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.title, self.render_body())
    }

    fn line(
        &self,
        id: &str,
        name: &str,
        used: &str,
        used_limit: &str,
        exclusive: &str,
        exclusive_limit: &str,
    ) -> String {
        let w = &self.widths;
        format!(
            "{:>id_w$}{sep}{:<name_w$}{sep}{:>mag_w$}{sep}{:>ul_w$}{sep}{:>mag_w$}{sep}{:>el_w$}",
            id,
            name,
            used,
            used_limit,
            exclusive,
            exclusive_limit,
            sep = SEPARATOR,
            id_w = w.id,
            name_w = w.name,
            mag_w = MAGNITUDE_WIDTH,
            ul_w = w.used_limit,
            el_w = w.exclusive_limit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::QuotaRecord;
    use crate::subvolume::Subvolume;

    fn entry(id: &str, name: &str, quota: QuotaRecord) -> ReportEntry {
        ReportEntry {
            subvolume: Subvolume::new(id, name),
            quota: QuotaRecord {
                volume_id: id.to_string(),
                ..quota
            },
        }
    }

    fn usage(referenced: u64, exclusive: u64) -> QuotaRecord {
        QuotaRecord {
            referenced,
            exclusive,
            ..Default::default()
        }
    }

    fn sample_report() -> Report {
        Report {
            path: "/".to_string(),
            entries: vec![entry("258", "path", usage(1_048_576, 524_288))],
            total_exclusive: 524_288,
        }
    }

    #[test]
    fn test_row_from_entry() {
        let row = ReportRow::from_entry(&entry("258", "path", usage(1_048_576, 524_288)));
        assert_eq!(row.used, "   1.0 MiB");
        assert_eq!(row.used_limit, "none");
        assert_eq!(row.exclusive, " 512.0 KiB");
        assert_eq!(row.exclusive_limit, "none");
    }

    #[test]
    fn test_row_with_limits() {
        let quota = QuotaRecord {
            max_referenced: 2_097_152,
            max_exclusive: 3,
            ..usage(1_048_576, 2)
        };
        let row = ReportRow::from_entry(&entry("300", "srv", quota));
        assert_eq!(row.used_limit, "2.0 MiB ( 50%)");
        assert_eq!(row.exclusive_limit, "3.0 B ( 66%)");
    }

    #[test]
    fn test_minimum_widths() {
        let widths = ColumnWidths::new();
        assert_eq!(widths.id, 2);
        assert_eq!(widths.name, 14);
        assert_eq!(widths.used_limit, 10);
        assert_eq!(widths.exclusive_limit, 11);
    }

    #[test]
    fn test_widths_never_shrink_below_headers() {
        let report = Report {
            path: "/".to_string(),
            entries: vec![entry("5", "a", usage(1, 1))],
            total_exclusive: 1,
        };
        let table = ReportTable::from_report(&report);
        assert_eq!(table.widths, ColumnWidths::new());
    }

    #[test]
    fn test_widths_grow_with_content() {
        let quota = QuotaRecord {
            max_referenced: 10 * 1024 * 1024 * 1024,
            max_exclusive: 1024,
            ..usage(1, 1)
        };
        let report = Report {
            path: "/".to_string(),
            entries: vec![
                entry("1234567", "a/rather/long/subvolume/path", quota),
                entry("9", "x", usage(1, 1)),
            ],
            total_exclusive: 2,
        };
        let table = ReportTable::from_report(&report);
        assert_eq!(table.widths.id, 7);
        assert_eq!(table.widths.name, "a/rather/long/subvolume/path".len());
        assert_eq!(table.widths.used_limit, "10.0 GiB (  0%)".len());
        assert_eq!(table.widths.exclusive_limit, "1.0 KiB (  0%)".len());

        let lines: Vec<String> = table.rows.iter().map(|r| table.row_line(r)).collect();
        assert!(lines.iter().all(|l| l.len() == table.widths.line_width()));
        assert_eq!(table.header_line().len(), table.widths.line_width());
    }

    #[test]
    fn test_render_sample() {
        let table = ReportTable::from_report(&sample_report());
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Subvolume usage on '/':");
        assert_eq!(
            lines[1],
            " ID  Subvolume name        Used  Used limit   Exclusive  Excl. limit"
        );
        assert_eq!(lines[2], "-".repeat(68));
        assert_eq!(
            lines[3],
            "258  path               1.0 MiB        none   512.0 KiB         none"
        );
        assert_eq!(lines[4], lines[2]);
        assert_eq!(lines[5].trim_start(), "Sum:     512.0 KiB");
    }

    #[test]
    fn test_summary_aligns_with_exclusive_column() {
        let table = ReportTable::from_report(&sample_report());
        let row = table.row_line(&table.rows[0]);
        let summary = table.summary_line();
        let end = table.widths.exclusive_end();

        assert_eq!(summary.len(), end);
        assert_eq!(&summary[end - MAGNITUDE_WIDTH..], &row[end - MAGNITUDE_WIDTH..end]);
    }

    #[test]
    fn test_rows_keep_report_order() {
        let report = Report {
            path: "/mnt/pool".to_string(),
            entries: vec![
                entry("300", "zeta", usage(3, 3)),
                entry("256", "alpha", usage(1, 1)),
            ],
            total_exclusive: 4,
        };
        let table = ReportTable::from_report(&report);
        let body = table.render_body();
        let zeta = body.find("zeta").unwrap();
        let alpha = body.find("alpha").unwrap();
        assert!(zeta < alpha);
        assert!(table.render().starts_with("Subvolume usage on '/mnt/pool':\n"));
    }
}
