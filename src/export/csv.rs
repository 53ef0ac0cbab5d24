//! CSV report export
//!
//! One row per total: a `Total` row for each section followed by its
//! groups, then breakdown rows, then the comparison deltas. Amounts are
//! plain decimals without a currency symbol.

use std::io::Write;

use serde::Serialize;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{DateInterval, Money};
use crate::reports::{AggregationResult, PercentChange, Report};

#[derive(Debug, Serialize)]
struct CsvRow {
    section: String,
    start: String,
    end: String,
    group: String,
    expenses: String,
    income: String,
    net: String,
    count: usize,
    percent_change: String,
}

fn amount(money: Money) -> String {
    money.format_with_symbol("")
}

fn bounds(interval: &DateInterval) -> (String, String) {
    if interval.is_all_time() {
        (String::new(), String::new())
    } else {
        (interval.start().to_string(), interval.end().to_string())
    }
}

fn total_row(section: &str, interval: &DateInterval, totals: &AggregationResult) -> CsvRow {
    let (start, end) = bounds(interval);
    CsvRow {
        section: section.to_string(),
        start,
        end,
        group: "Total".to_string(),
        expenses: amount(totals.total_expense),
        income: amount(totals.total_income),
        net: amount(totals.net),
        count: totals.count,
        percent_change: String::new(),
    }
}

fn change_row(group: &str, change: Money, percent: PercentChange) -> CsvRow {
    CsvRow {
        section: "Change".to_string(),
        start: String::new(),
        end: String::new(),
        group: group.to_string(),
        expenses: String::new(),
        income: String::new(),
        net: amount(change),
        count: 0,
        percent_change: percent
            .value()
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default(),
    }
}

/// Export a report's totals to CSV
pub fn export_report_csv<W: Write>(report: &Report, writer: &mut W) -> TrackerResult<()> {
    let mut rows = Vec::new();

    for section in &report.sections {
        rows.push(total_row(&section.label, &section.interval, &section.aggregation));
        let (start, end) = bounds(&section.interval);
        for group in &section.aggregation.groups {
            rows.push(CsvRow {
                section: section.label.clone(),
                start: start.clone(),
                end: end.clone(),
                group: report.key_label(&group.key),
                expenses: amount(group.total_expense),
                income: amount(group.total_income),
                net: amount(group.net()),
                count: group.count,
                percent_change: String::new(),
            });
        }
    }

    for row in &report.breakdown {
        let mut csv_row = total_row("Breakdown", &row.interval, &row.totals);
        csv_row.group = row.label.clone();
        rows.push(csv_row);
    }

    if let Some(delta) = &report.comparison {
        rows.push(change_row("Net", delta.net_change, delta.percent_change));
        rows.push(change_row("Income", delta.income_change, delta.income_percent_change));
        rows.push(change_row(
            "Expenses",
            delta.expense_change,
            delta.expense_percent_change,
        ));
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in &rows {
        csv_writer
            .serialize(row)
            .map_err(|e| TrackerError::Export(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| TrackerError::Export(e.to_string()))
}
