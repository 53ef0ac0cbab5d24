//! Category display formatting

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Category, CategoryId};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Transactions")]
    usage: usize,
}

/// Format categories as a table with their transaction counts
pub fn format_category_list(
    categories: &[Category],
    usage: &HashMap<CategoryId, usize>,
) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'expense init' to create default categories."
            .to_string();
    }

    let rows = categories.iter().map(|category| CategoryRow {
        id: category.id.to_string(),
        name: category.name.clone(),
        kind: category.kind.to_string(),
        usage: usage.get(&category.id).copied().unwrap_or(0),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}
