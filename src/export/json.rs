//! JSON report export with schema versioning

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::reports::Report;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Envelope written around an exported report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    /// Version of the tool that wrote the export
    pub app_version: String,
    pub report: Report,
}

impl ReportExport {
    pub fn new(report: &Report) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            report: report.clone(),
        }
    }
}

/// Export a report to JSON
pub fn export_report_json<W: Write>(
    report: &Report,
    writer: &mut W,
    pretty: bool,
) -> TrackerResult<()> {
    let export = ReportExport::new(report);

    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)
    } else {
        serde_json::to_writer(&mut *writer, &export)
    }
    .map_err(|e| TrackerError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| TrackerError::Export(e.to_string()))
}
