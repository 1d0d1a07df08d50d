use crate::errors::Result;
use crate::processor::FileOutcome;
use crate::runner::{FileReport, RunReport, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Defines the possible output formats for run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A simple, human-readable text format.
    Text,
    /// JSON format, suitable for machine processing.
    Json,
    /// Comma-Separated Values format, one row per reported file.
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

/// Renders a `RunReport` in one of the supported formats.
pub struct OutputFormatter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the formatted report to `writer`.
    pub fn write_report<W: Write>(&self, writer: &mut W, report: &RunReport) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text(report),
            OutputFormat::Json => self.format_json(report)?,
            OutputFormat::Csv => self.format_csv(report)?,
        };
        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    /// One line per reported file, then the run totals.
    fn format_text(&self, report: &RunReport) -> String {
        let mut output = String::new();
        for file in &report.files {
            output.push_str(&format_file_line(file, report.preview_only));
            output.push('\n');
        }
        output.push('\n');
        output.push_str(&format_summary(&report.summary));
        output
    }

    fn format_json(&self, report: &RunReport) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            run_time: DateTime<Utc>,
            preview_only: bool,
            summary: &'a RunSummary,
            files: Vec<JsonFile>,
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        #[derive(Serialize)]
        struct JsonFile {
            path: String,
            outcome: &'static str,
            replacements: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<String>,
        }

        let files = report
            .files
            .iter()
            .map(|f| JsonFile {
                path: f.path.display().to_string(),
                outcome: f.outcome.kind(),
                replacements: f.outcome.replacements(),
                error: error_reason(&f.outcome).map(str::to_string),
            })
            .collect();

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            run_time: Utc::now(),
            preview_only: report.preview_only,
            summary: &report.summary,
            files,
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_csv(&self, report: &RunReport) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(["Path", "Outcome", "Replacements", "Error"])?;
        for f in &report.files {
            wtr.write_record([
                f.path.display().to_string().as_str(),
                f.outcome.kind(),
                f.outcome.replacements().to_string().as_str(),
                error_reason(&f.outcome).unwrap_or(""),
            ])?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| format!("CSV writer error: {e}"))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

/// Formats the report line for one file.
pub fn format_file_line(file: &FileReport, preview_only: bool) -> String {
    let path = file.path.display();
    match &file.outcome {
        FileOutcome::Sanitized(count) if preview_only => {
            format!("  ✓ Would sanitize ({count} replacements): {path}")
        }
        FileOutcome::Sanitized(count) => format!("  ✓ Sanitized ({count} replacements): {path}"),
        FileOutcome::SkippedReadError(_) => format!("  ⚠️  Skipped (read error): {path}"),
        FileOutcome::SkippedWriteError(_) => format!("  ⚠️  Skipped (write error): {path}"),
        FileOutcome::Unchanged => format!("  Unchanged: {path}"),
    }
}

/// Formats the run totals.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = format!(
        "Files scanned: {}\nFiles modified: {}\nTotal replacements: {}\n",
        summary.files_scanned, summary.files_modified, summary.total_replacements
    );
    if summary.files_skipped > 0 {
        output.push_str(&format!("Files skipped: {}\n", summary.files_skipped));
    }
    if summary.cancelled {
        output.push_str("Run cancelled before all files were processed\n");
    }
    output
}

fn error_reason(outcome: &FileOutcome) -> Option<&str> {
    match outcome {
        FileOutcome::SkippedReadError(reason) | FileOutcome::SkippedWriteError(reason) => {
            Some(reason.as_str())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_report(preview_only: bool) -> RunReport {
        RunReport {
            summary: RunSummary {
                files_scanned: 3,
                files_modified: 1,
                total_replacements: 3,
                files_skipped: 1,
                cancelled: false,
            },
            files: vec![
                FileReport {
                    path: PathBuf::from("docs/a.md"),
                    outcome: FileOutcome::Sanitized(3),
                },
                FileReport {
                    path: PathBuf::from("docs/b.txt"),
                    outcome: FileOutcome::SkippedReadError("stream did not contain valid UTF-8".into()),
                },
            ],
            preview_only,
        }
    }

    fn render(format: OutputFormat, report: &RunReport) -> String {
        let mut buf = Vec::new();
        OutputFormatter::new(format).write_report(&mut buf, report).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_output() {
        let text = render(OutputFormat::Text, &sample_report(false));
        assert!(text.contains("  ✓ Sanitized (3 replacements): docs/a.md\n"));
        assert!(text.contains("  ⚠️  Skipped (read error): docs/b.txt\n"));
        assert!(text.contains("Files scanned: 3\nFiles modified: 1\nTotal replacements: 3\n"));
        assert!(text.contains("Files skipped: 1"));
    }

    #[test]
    fn test_text_output_in_preview() {
        let text = render(OutputFormat::Text, &sample_report(true));
        assert!(text.contains("  ✓ Would sanitize (3 replacements): docs/a.md"));
    }

    #[test]
    fn test_json_output() {
        let json = render(OutputFormat::Json, &sample_report(true));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tool"]["name"], "scrubber");
        assert_eq!(value["preview_only"], true);
        assert_eq!(value["summary"]["total_replacements"], 3);
        assert_eq!(value["files"][0]["outcome"], "sanitized");
        assert_eq!(value["files"][1]["outcome"], "read_error");
        assert!(value["files"][0].get("error").is_none());
    }

    #[test]
    fn test_csv_output() {
        let csv = render(OutputFormat::Csv, &sample_report(false));
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Path,Outcome,Replacements,Error"));
        assert_eq!(lines.next(), Some("docs/a.md,sanitized,3,"));
        assert_eq!(
            lines.next(),
            Some("docs/b.txt,read_error,0,stream did not contain valid UTF-8")
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Csv);
        assert_eq!(OutputFormat::from("whatever"), OutputFormat::Text);
    }
}
