//! The audit log file
//!
//! One JSON object per line, appended as mutations happen and never
//! rewritten. Reads stream the records back with serde_json's stream
//! deserializer, so a corrupt record is reported with its line and column.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{TrackerError, TrackerResult};

use super::entry::{AuditEntry, EntityType};

/// Append-only record of every create, update and delete
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single line
    pub fn append(&self, entry: &AuditEntry) -> TrackerResult<()> {
        let mut line = serde_json::to_vec(entry)
            .map_err(|e| TrackerError::Json(format!("Failed to encode audit entry: {}", e)))?;
        line.push(b'\n');

        // One write per line keeps concurrent appends from interleaving
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(&line))
            .map_err(|e| {
                TrackerError::Io(format!(
                    "Failed to append to {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        tracing::debug!(
            operation = %entry.operation,
            entity = %entry.entity_type,
            id = %entry.entity_id,
            "audited"
        );
        Ok(())
    }

    /// Every entry, oldest first
    pub fn entries(&self) -> TrackerResult<Vec<AuditEntry>> {
        self.scan(|_| true)
    }

    /// Entries about one transaction or category, oldest first
    pub fn history(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> TrackerResult<Vec<AuditEntry>> {
        self.scan(|entry| entry.entity_type == entity_type && entry.entity_id == entity_id)
    }

    /// The newest `count` entries, oldest first
    pub fn recent(&self, count: usize) -> TrackerResult<Vec<AuditEntry>> {
        let mut entries = self.entries()?;
        let skip = entries.len().saturating_sub(count);
        Ok(entries.split_off(skip))
    }

    fn scan(&self, mut keep: impl FnMut(&AuditEntry) -> bool) -> TrackerResult<Vec<AuditEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TrackerError::Io(format!(
                    "Failed to open {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let mut kept = Vec::new();
        let stream =
            serde_json::Deserializer::from_reader(BufReader::new(file)).into_iter::<AuditEntry>();
        for entry in stream {
            let entry = entry.map_err(|e| {
                TrackerError::Json(format!(
                    "Corrupt audit log {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            if keep(&entry) {
                kept.push(entry);
            }
        }

        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::Operation;
    use serde_json::json;
    use tempfile::TempDir;

    fn audit_log() -> (AuditLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = AuditLog::new(temp_dir.path().join("audit.log"));
        (log, temp_dir)
    }

    fn transaction_created(id: &str, cents: i64) -> AuditEntry {
        AuditEntry::create(
            EntityType::Transaction,
            id,
            Some(format!("${}.{:02}", cents / 100, cents % 100)),
            &json!({ "amount": cents }),
        )
    }

    #[test]
    fn test_missing_log_is_empty() {
        let (log, _temp) = audit_log();
        assert!(log.entries().unwrap().is_empty());
        assert!(log.history(EntityType::Category, "cat-1").unwrap().is_empty());
    }

    #[test]
    fn test_appended_entries_are_one_per_line() {
        let (log, _temp) = audit_log();
        log.append(&transaction_created("txn-1", 1_250)).unwrap();
        log.append(&transaction_created("txn-2", 4_000)).unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);

        let entries = log.entries().unwrap();
        assert_eq!(entries[0].entity_id, "txn-1");
        assert_eq!(entries[1].operation, Operation::Create);
    }

    #[test]
    fn test_history_follows_one_entity() {
        let (log, _temp) = audit_log();
        log.append(&transaction_created("txn-1", 1_250)).unwrap();
        log.append(&transaction_created("txn-2", 4_000)).unwrap();
        log.append(&AuditEntry::update(
            EntityType::Transaction,
            "txn-1",
            None,
            &json!({ "amount": 1_250 }),
            &json!({ "amount": 1_500 }),
        ))
        .unwrap();
        log.append(&AuditEntry::create(
            EntityType::Category,
            "txn-1",
            None,
            &json!({}),
        ))
        .unwrap();

        let history = log.history(EntityType::Transaction, "txn-1").unwrap();
        let operations: Vec<_> = history.iter().map(|e| e.operation).collect();
        assert_eq!(operations, [Operation::Create, Operation::Update]);
        assert!(history[1].changes.is_some());
    }

    #[test]
    fn test_recent_keeps_order() {
        let (log, _temp) = audit_log();
        for i in 0..10 {
            log.append(&transaction_created(&format!("txn-{}", i), i)).unwrap();
        }

        let recent = log.recent(3).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, ["txn-7", "txn-8", "txn-9"]);
        assert_eq!(log.recent(50).unwrap().len(), 10);
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let (log, _temp) = audit_log();
        log.append(&transaction_created("txn-1", 100)).unwrap();
        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        writeln!(file, "{{not json}}").unwrap();

        match log.entries().unwrap_err() {
            TrackerError::Json(message) => assert!(message.contains("line 2"), "{}", message),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
