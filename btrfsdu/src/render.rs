//! Output of the report as a text table or JSON

use btrfsdulib::{human_size, Report, ReportTable};
use console::Style;
use serde::Serialize;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => OutputMode::Json,
            _ => OutputMode::Table,
        }
    }
}

/// JSON document for a finished report
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    btrfsdu_version: &'static str,
    #[serde(flatten)]
    report: &'a Report,
    total_exclusive_hr: String,
}

/// JSON document when no subvolume uses any space
#[derive(Debug, Serialize)]
struct JsonNoUsage<'a> {
    btrfsdu_version: &'static str,
    path: &'a str,
    subvolumes: usize,
    no_usage: bool,
}

/// Render a report in the requested format
pub fn render_report(report: &Report, mode: OutputMode) -> Result<String, serde_json::Error> {
    match mode {
        OutputMode::Json => {
            let doc = JsonReport {
                btrfsdu_version: env!("CARGO_PKG_VERSION"),
                report,
                total_exclusive_hr: human_size(report.total_exclusive, false),
            };
            Ok(serde_json::to_string_pretty(&doc)? + "\n")
        }
        OutputMode::Table => {
            let table = ReportTable::from_report(report);
            let title = Style::new().bold().apply_to(&table.title);
            Ok(format!("{}\n{}", title, table.render_body()))
        }
    }
}

/// Render the hint shown when quota accounting reports no usage at all
pub fn render_no_usage(
    path: &str,
    subvolumes: usize,
    mode: OutputMode,
) -> Result<String, serde_json::Error> {
    match mode {
        OutputMode::Json => {
            let doc = JsonNoUsage {
                btrfsdu_version: env!("CARGO_PKG_VERSION"),
                path,
                subvolumes,
                no_usage: true,
            };
            Ok(serde_json::to_string_pretty(&doc)? + "\n")
        }
        OutputMode::Table => Ok(format!(
            "Found {} subvolume(s) on '{}', but none of them uses any space.\n\
             Quota accounting may be out of date; run again with --rescan.\n",
            subvolumes, path
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use btrfsdulib::{QuotaRecord, ReportEntry, Subvolume};

    fn sample_report() -> Report {
        Report {
            path: "/".to_string(),
            entries: vec![ReportEntry {
                subvolume: Subvolume::new("258", "home"),
                quota: QuotaRecord {
                    volume_id: "258".to_string(),
                    referenced: 1_048_576,
                    exclusive: 524_288,
                    ..Default::default()
                },
            }],
            total_exclusive: 524_288,
        }
    }

    #[test]
    fn test_output_mode_from_name() {
        assert_eq!(OutputMode::from_name("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_name("table"), OutputMode::Table);
    }

    #[test]
    fn test_table_output() {
        let text = render_report(&sample_report(), OutputMode::Table).unwrap();
        assert!(text.contains("Subvolume usage on '/':"));
        assert!(text.contains("home"));
        assert!(text.trim_end().ends_with("Sum:     512.0 KiB"));
    }

    #[test]
    fn test_json_output() {
        let text = render_report(&sample_report(), OutputMode::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["path"], "/");
        assert_eq!(value["total_exclusive"], 524_288);
        assert_eq!(value["total_exclusive_hr"], "512.0 KiB");
        assert_eq!(value["entries"][0]["subvolume"]["name"], "home");
    }

    #[test]
    fn test_no_usage_hint() {
        let text = render_no_usage("/mnt", 3, OutputMode::Table).unwrap();
        assert!(text.contains("3 subvolume(s) on '/mnt'"));
        assert!(text.contains("--rescan"));

        let json = render_no_usage("/mnt", 3, OutputMode::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["subvolumes"], 3);
        assert_eq!(value["no_usage"], true);
    }
}
