//! YAML report export

use std::io::Write;

use crate::error::{TrackerError, TrackerResult};
use crate::export::json::ReportExport;
use crate::reports::Report;

/// Export a report to YAML, preceded by a comment header
pub fn export_report_yaml<W: Write>(report: &Report, writer: &mut W) -> TrackerResult<()> {
    let export = ReportExport::new(report);
    let io_err = |e: std::io::Error| TrackerError::Export(e.to_string());

    writeln!(writer, "# Expense Tracker {}", report.title()).map_err(io_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(io_err)?;
    writeln!(writer, "# App Version: {}", export.app_version).map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| TrackerError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DateInterval, Money, Transaction, TransactionKind};
    use crate::reports::{aggregate, GroupBy, ReportKind, ReportSection};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    #[test]
    fn test_yaml_export() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let travel = Category::new("Travel", TransactionKind::Expense);
        let transactions =
            vec![Transaction::expense(Money::from_cents(8_900), day).with_category(travel.id)];

        let report = Report {
            kind: ReportKind::Category,
            generated_on: day,
            sections: vec![ReportSection {
                label: "Travel".into(),
                interval: DateInterval::single_day(day),
                aggregation: aggregate(&transactions, GroupBy::Day),
                transactions,
            }],
            breakdown: Vec::new(),
            category_names: BTreeMap::from([(travel.id, travel.name.clone())]),
            category: Some(travel),
            comparison: None,
        };

        let mut output = Vec::new();
        export_report_yaml(&report, &mut output).unwrap();
        let yaml = String::from_utf8(output).unwrap();

        assert!(yaml.starts_with("# Expense Tracker Category Report: Travel"));
        assert!(yaml.contains("kind: category"));
        assert!(yaml.contains("total_expense: 8900"));

        let body: String = yaml
            .lines()
            .filter(|line| !line.starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed: serde_yaml::Value = serde_yaml::from_str(&body).unwrap();
        assert_eq!(parsed["report"]["category"]["name"].as_str(), Some("Travel"));
    }
}
