//! Storage layer
//!
//! JSON files with atomic writes, one repository per entity, coordinated by
//! [`Storage`]. Reports read through the [`TransactionStore`] trait so they
//! can run against any backend.

pub mod categories;
pub mod data_file;
pub mod init;
pub mod query;
pub mod transactions;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

pub use categories::CategoryRepository;
pub use init::initialize_storage;
pub use query::TransactionQuery;
pub use transactions::TransactionRepository;

use crate::audit::{AuditEntry, AuditLog, EntityType};
use crate::config::paths::TrackerPaths;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, CategoryId, Transaction};

/// Read access to recorded transactions and categories
pub trait TransactionStore {
    /// Transactions matching the query, newest first
    fn find_transactions(&self, query: &TransactionQuery) -> TrackerResult<Vec<Transaction>>;

    /// A category by id, `None` if it doesn't exist
    fn find_category(&self, id: CategoryId) -> TrackerResult<Option<Category>>;
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> TrackerResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> TrackerResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TrackerPaths,
    pub transactions: TransactionRepository,
    pub categories: CategoryRepository,
    audit: AuditLog,
}

impl Storage {
    /// Open storage under `paths`, creating directories as needed
    pub fn new(paths: TrackerPaths) -> TrackerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            audit: AuditLog::new(paths.audit_log()),
            paths,
        })
    }

    /// Open storage and load everything from disk
    pub fn open(paths: TrackerPaths) -> TrackerResult<Self> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> TrackerResult<()> {
        self.transactions.load()?;
        self.categories.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> TrackerResult<()> {
        self.transactions.save()?;
        self.categories.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> TrackerResult<()> {
        self.audit.append(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> TrackerResult<()> {
        self.audit.append(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> TrackerResult<()> {
        self.audit.append(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

impl TransactionStore for Storage {
    fn find_transactions(&self, query: &TransactionQuery) -> TrackerResult<Vec<Transaction>> {
        let transactions = self.transactions.query(query)?;
        tracing::debug!(
            interval = %query.interval,
            kind = ?query.kind,
            category = ?query.category_id,
            found = transactions.len(),
            "queried transactions"
        );
        Ok(transactions)
    }

    fn find_category(&self, id: CategoryId) -> TrackerResult<Option<Category>> {
        self.categories.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::models::{Money, TransactionKind};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_storage();
        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_store_trait_reads_repositories() {
        let (_temp_dir, storage) = create_storage();
        let category = Category::new("Food", TransactionKind::Expense);
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        storage.categories.upsert(category.clone()).unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(Money::from_cents(1250), date).with_category(category.id))
            .unwrap();

        let store: &dyn TransactionStore = &storage;
        assert_eq!(store.find_category(category.id).unwrap(), Some(category.clone()));
        assert_eq!(store.find_category(CategoryId::new()).unwrap(), None);
        let found = store
            .find_transactions(&TransactionQuery::new().category(category.id))
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_save_all_and_reopen() {
        let (temp_dir, storage) = create_storage();
        storage
            .categories
            .upsert(Category::new("Gift", TransactionKind::Income))
            .unwrap();
        storage.save_all().unwrap();

        let reopened =
            Storage::open(TrackerPaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(reopened.categories.count().unwrap(), 1);
    }

    #[test]
    fn test_log_helpers_write_audit_entries() {
        let (_temp_dir, storage) = create_storage();
        let category = Category::new("Gift", TransactionKind::Income);
        storage
            .log_create(EntityType::Category, category.id.to_string(), None, &category)
            .unwrap();
        storage
            .log_delete(EntityType::Category, category.id.to_string(), None, &category)
            .unwrap();

        let entries = storage.audit().entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].operation, Operation::Delete);
    }
}
