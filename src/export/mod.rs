//! Report export
//!
//! Reports can be written as plain text (the terminal rendering), JSON or
//! YAML (the full report structure) or CSV (one row per total).

pub mod csv;
pub mod json;
pub mod yaml;

use std::fmt;
use std::io::Write;

use clap::ValueEnum;

use crate::config::Settings;
use crate::display::format_report;
use crate::error::{TrackerError, TrackerResult};
use crate::reports::Report;

pub use self::csv::export_report_csv;
pub use json::{export_report_json, ReportExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_report_yaml;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// Terminal rendering
    #[default]
    Text,
    /// Full report structure
    Json,
    /// Full report structure, human-readable
    Yaml,
    /// Totals only, spreadsheet-compatible
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write a report in the requested format
pub fn export_report<W: Write>(
    report: &Report,
    format: ExportFormat,
    settings: &Settings,
    writer: &mut W,
) -> TrackerResult<()> {
    tracing::debug!(kind = ?report.kind, %format, "exporting report");
    match format {
        ExportFormat::Text => writeln!(writer, "{}", format_report(report, settings))
            .map_err(|e| TrackerError::Export(e.to_string())),
        ExportFormat::Json => export_report_json(report, writer, true),
        ExportFormat::Yaml => export_report_yaml(report, writer),
        ExportFormat::Csv => export_report_csv(report, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::from_str("json", false), Ok(ExportFormat::Json));
        assert!(ExportFormat::from_str("xml", false).is_err());
        assert_eq!(ExportFormat::default().to_string(), "text");
        assert_eq!(ExportFormat::Csv.as_str(), "csv");
    }
}
