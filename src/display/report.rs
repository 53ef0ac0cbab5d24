//! Report formatting for terminal output

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::dates::format_with;
use crate::models::Money;
use crate::reports::{
    AggregationResult, BreakdownRow, ComparisonDelta, GroupBy, PercentChange, Report,
    ReportSection,
};

use super::truncate;

const WIDTH: usize = 60;
const BAR_WIDTH: usize = 20;

#[derive(Tabled)]
struct TotalsRow {
    #[tabled(rename = "Group")]
    label: String,
    #[tabled(rename = "Expenses")]
    expense: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Net")]
    net: String,
    #[tabled(rename = "Count")]
    count: usize,
}

/// Render a report as text
pub fn format_report(report: &Report, settings: &Settings) -> String {
    let symbol = settings.currency_symbol.as_str();
    let mut output = String::new();

    output.push_str(&double_separator(WIDTH));
    output.push('\n');
    output.push_str(&format_header(&report.title(), WIDTH));
    output.push('\n');
    output.push_str(&double_separator(WIDTH));
    output.push('\n');
    output.push_str(&format!(
        "Generated {}\n",
        format_with(report.generated_on, &settings.date_format)
    ));

    for section in &report.sections {
        output.push('\n');
        output.push_str(&format_section(report, section, symbol));
    }

    if !report.breakdown.is_empty() {
        output.push('\n');
        output.push_str("Breakdown\n");
        output.push_str(&format_breakdown(&report.breakdown, symbol));
        output.push('\n');
    }

    if let Some(delta) = &report.comparison {
        output.push('\n');
        output.push_str(&format_comparison(delta, symbol));
    }

    output
}

fn format_section(report: &Report, section: &ReportSection, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", section.label));
    if section.label != section.interval.to_string() {
        output.push_str(&format!("{}\n", section.interval));
    }
    output.push_str(&separator(WIDTH));
    output.push('\n');

    let totals = &section.aggregation;
    if totals.is_empty() {
        output.push_str("No transactions in this period.\n");
        return output;
    }

    output.push_str(&format_totals(totals, symbol));

    if !totals.groups.is_empty() && totals.group_by != GroupBy::None {
        let rows = totals.groups.iter().map(|group| TotalsRow {
            label: truncate(&report.key_label(&group.key), 28),
            expense: group.total_expense.format_with_symbol(symbol),
            income: group.total_income.format_with_symbol(symbol),
            net: group.net().format_signed(symbol),
            count: group.count,
        });
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        output.push('\n');
        output.push_str(&format!("By {}\n", totals.group_by));
        output.push_str(&table.to_string());
        output.push('\n');
    }

    let top = totals.top_expenses();
    if totals.group_by == GroupBy::Category && !top.is_empty() {
        let max = top[0].total_expense.cents() as f64;
        let total = totals.total_expense.cents() as f64;
        output.push('\n');
        output.push_str("Top spending\n");
        for group in top.iter().take(5) {
            let value = group.total_expense.cents() as f64;
            output.push_str(&format!(
                "  {:<20} {} {:>12} {:>5}\n",
                truncate(&report.key_label(&group.key), 20),
                format_bar(value, max, BAR_WIDTH),
                group.total_expense.format_with_symbol(symbol),
                format_percentage(value / total * 100.0)
            ));
        }
    }

    output
}

fn format_totals(totals: &AggregationResult, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Income:        {}\n",
        totals.total_income.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Expenses:      {}\n",
        totals.total_expense.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Net:           {}\n", totals.net.format_signed(symbol)));
    output.push_str(&format!(
        "Transactions:  {} ({} expense, {} income)\n",
        totals.count, totals.expense_count, totals.income_count
    ));
    if totals.expense_count > 0 {
        output.push_str(&format!(
            "Avg expense:   {}\n",
            totals.average_expense().format_with_symbol(symbol)
        ));
    }
    if totals.income_count > 0 {
        output.push_str(&format!(
            "Avg income:    {}\n",
            totals.average_income().format_with_symbol(symbol)
        ));
    }
    output
}

fn format_breakdown(rows: &[BreakdownRow], symbol: &str) -> String {
    let rows = rows.iter().map(|row| TotalsRow {
        label: row.label.clone(),
        expense: row.totals.total_expense.format_with_symbol(symbol),
        income: row.totals.total_income.format_with_symbol(symbol),
        net: row.totals.net.format_signed(symbol),
        count: row.totals.count,
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn format_comparison(delta: &ComparisonDelta, symbol: &str) -> String {
    let line = |label: &str, change: Money, percent: &PercentChange| {
        format!("{:<14} {} ({})\n", label, change.format_signed(symbol), percent)
    };

    let mut output = String::new();
    output.push_str("Change from baseline\n");
    output.push_str(&separator(WIDTH));
    output.push('\n');
    output.push_str(&line("Net:", delta.net_change, &delta.percent_change));
    output.push_str(&line("Income:", delta.income_change, &delta.income_percent_change));
    output.push_str(&line(
        "Expenses:",
        delta.expense_change,
        &delta.expense_percent_change,
    ));
    output
}

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct < 0.1 && pct > 0.0 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Horizontal bar proportional to `value / max_value`
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return " ".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Center a title within `width` columns
pub fn format_header(title: &str, width: usize) -> String {
    let len = title.chars().count();
    let padding = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(padding), title)
}

pub fn separator(width: usize) -> String {
    "─".repeat(width)
}

pub fn double_separator(width: usize) -> String {
    "═".repeat(width)
}
