//! Display formatting for terminal output
//!
//! Turns transactions, categories, resolved dates and reports into text.
//! List views are `tabled` tables; reports mix tables with summary lines.

pub mod audit;
pub mod category;
pub mod date;
pub mod report;
pub mod transaction;

pub use audit::format_audit_lines;
pub use category::format_category_list;
pub use date::format_resolved;
pub use report::format_report;
pub use transaction::{format_transaction_details, format_transaction_table};

/// Truncate to `max_len` characters, marking the cut with an ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
