//! JSON documents backing the repositories
//!
//! Each repository owns one [`DataFile`]. Saving serializes the whole
//! document in memory first, writes it to a sibling `.tmp` file, syncs it and
//! renames it over the document, so a failed save leaves the previous
//! contents in place. A missing or blank document loads as the empty default.

use std::ffi::OsString;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// One JSON document on disk
#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the document, or the default when nothing has been saved yet
    pub fn load<T>(&self) -> TrackerResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no data file yet");
                return Ok(T::default());
            }
            Err(e) => return Err(self.error("read", e)),
        };

        if contents.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&contents).map_err(|e| self.error("parse", e))
    }

    /// Replace the document with `data`
    pub fn save<T>(&self, data: &T) -> TrackerResult<()>
    where
        T: Serialize,
    {
        let mut bytes = serde_json::to_vec_pretty(data).map_err(|e| self.error("serialize", e))?;
        bytes.push(b'\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.error("create the directory for", e))?;
        }

        // Same directory as the document so the rename stays on one filesystem
        let temp = self.temp_path();
        if let Err(e) = write_synced(&temp, &bytes).and_then(|_| fs::rename(&temp, &self.path)) {
            let _ = fs::remove_file(&temp);
            return Err(self.error("save", e));
        }

        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "data file saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn error(&self, action: &str, cause: impl Display) -> TrackerError {
        TrackerError::Storage(format!(
            "Failed to {} {}: {}",
            action,
            self.path.display(),
            cause
        ))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, Transaction};
    use chrono::NaiveDate;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Ledger {
        transactions: Vec<Transaction>,
    }

    fn sample() -> Ledger {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        Ledger {
            transactions: vec![
                Transaction::expense(Money::from_cents(1_250), date),
                Transaction::income(Money::from_cents(300_000), date),
            ],
        }
    }

    #[test]
    fn test_missing_and_blank_files_load_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = DataFile::new(temp_dir.path().join("transactions.json"));
        assert!(!file.exists());
        assert_eq!(file.load::<Ledger>().unwrap(), Ledger::default());

        fs::write(file.path(), "  \n").unwrap();
        assert_eq!(file.load::<Ledger>().unwrap(), Ledger::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = DataFile::new(temp_dir.path().join("transactions.json"));

        file.save(&sample()).unwrap();

        assert_eq!(file.load::<Ledger>().unwrap(), sample());
        assert!(!temp_dir.path().join("transactions.json.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file = DataFile::new(temp_dir.path().join("data").join("categories.json"));

        file.save(&sample()).unwrap();
        assert!(file.exists());
    }

    #[test]
    fn test_corrupt_file_names_the_document() {
        let temp_dir = TempDir::new().unwrap();
        let file = DataFile::new(temp_dir.path().join("transactions.json"));
        fs::write(file.path(), "not json at all").unwrap();

        match file.load::<Ledger>().unwrap_err() {
            TrackerError::Storage(message) => {
                assert!(message.starts_with("Failed to parse"), "{}", message);
                assert!(message.contains("transactions.json"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_failed_save_cleans_up_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        // A directory in the document's place makes the rename fail
        fs::create_dir(&path).unwrap();

        let err = DataFile::new(&path).save(&sample()).unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert!(!temp_dir.path().join("transactions.json.tmp").exists());
        assert!(path.is_dir());
    }
}
