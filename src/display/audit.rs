//! Audit trail formatting

use crate::audit::AuditEntry;

/// One line per entry, oldest first
pub fn format_audit_lines(entries: &[AuditEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("  {}\n", entry.format_line()))
        .collect()
}
