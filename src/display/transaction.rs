//! Transaction display formatting

use std::collections::HashMap;

use chrono::NaiveDate;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::dates::{format_relative, format_with};
use crate::models::{CategoryId, Transaction};

use super::truncate;

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn category_label(txn: &Transaction, category_names: &HashMap<CategoryId, String>) -> String {
    match txn.category_id {
        Some(id) => category_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string()),
        None => "(uncategorized)".to_string(),
    }
}

/// Format transactions as a table
pub fn format_transaction_table(
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
    settings: &Settings,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.".to_string();
    }

    let rows = transactions.iter().map(|txn| TransactionRow {
        id: txn.id.to_string(),
        date: format_with(txn.date, &settings.date_format),
        kind: txn.kind.to_string(),
        amount: txn
            .signed_amount()
            .format_signed(&settings.currency_symbol),
        category: truncate(&category_label(txn, category_names), 24),
        description: truncate(txn.description.as_deref().unwrap_or(""), 40),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n{} transaction(s)", table, transactions.len())
}

/// Format transaction details for display
pub fn format_transaction_details(
    txn: &Transaction,
    category_name: Option<&str>,
    settings: &Settings,
    today: NaiveDate,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!(
        "Date:        {} ({})\n",
        format_with(txn.date, &settings.long_date_format),
        format_relative(txn.date, today)
    ));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_symbol(&settings.currency_symbol)
    ));

    match category_name {
        Some(name) => output.push_str(&format!("Category:    {}\n", name)),
        None => output.push_str("Category:    (uncategorized)\n"),
    }

    if let Some(description) = &txn.description {
        output.push_str(&format!("Description: {}\n", description));
    }

    output.push_str(&format!(
        "Recorded:    {}\n",
        txn.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    if txn.updated_at != txn.created_at {
        output.push_str(&format!(
            "Modified:    {}\n",
            txn.updated_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    output
}
