//! Category service
//!
//! Creation, lookup and deletion of categories. Names are unique within a
//! kind, and a category still referenced by transactions cannot be deleted.

use tracing::info;

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, CategoryId, TransactionKind};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Create a new category
    pub fn create(&self, name: &str, kind: TransactionKind) -> TrackerResult<Category> {
        let category = Category::new(name.trim(), kind);
        category
            .validate(self.settings.max_category_name_length)
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        if !self
            .storage
            .categories
            .get_by_name(&category.name, Some(kind))?
            .is_empty()
        {
            return Err(TrackerError::Duplicate {
                entity_type: "Category",
                identifier: format!("{} ({})", category.name, kind),
            });
        }

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;
        info!(id = %category.id, name = %category.name, %kind, "category created");

        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> TrackerResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find a category by name (case-insensitive) or id
    ///
    /// `kind` narrows name lookups when the same name exists for both kinds.
    pub fn find(
        &self,
        identifier: &str,
        kind: Option<TransactionKind>,
    ) -> TrackerResult<Option<Category>> {
        let by_name = self.storage.categories.get_by_name(identifier, kind)?;
        match by_name.len() {
            0 => {}
            1 => return Ok(by_name.into_iter().next()),
            _ => {
                return Err(TrackerError::Validation(format!(
                    "'{}' names both an expense and an income category; pass --kind or use its id",
                    identifier.trim()
                )))
            }
        }

        if let Ok(id) = identifier.parse::<CategoryId>() {
            return self.storage.categories.get(id);
        }

        let mut by_reference = self.storage.categories.find_by_reference(identifier)?;
        match by_reference.len() {
            0 => Ok(None),
            1 => Ok(by_reference.pop()),
            n => Err(TrackerError::Validation(format!(
                "'{}' matches {} categories; use more of the id",
                identifier.trim(),
                n
            ))),
        }
    }

    /// Like [`find`](Self::find) but a missing category is an error
    pub fn resolve(
        &self,
        identifier: &str,
        kind: Option<TransactionKind>,
    ) -> TrackerResult<Category> {
        self.find(identifier, kind)?
            .ok_or_else(|| TrackerError::CategoryNotFound(identifier.trim().to_string()))
    }

    /// All categories, optionally of one kind
    pub fn list(&self, kind: Option<TransactionKind>) -> TrackerResult<Vec<Category>> {
        let mut categories = self.storage.categories.get_all()?;
        if let Some(kind) = kind {
            categories.retain(|c| c.kind == kind);
        }
        Ok(categories)
    }

    /// Number of transactions using a category
    pub fn usage_count(&self, id: CategoryId) -> TrackerResult<usize> {
        self.storage.transactions.count_by_category(id)
    }

    /// Delete an unused category
    pub fn delete(&self, id: CategoryId) -> TrackerResult<Category> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| TrackerError::CategoryNotFound(id.to_string()))?;

        let count = self.usage_count(id)?;
        if count > 0 {
            return Err(TrackerError::CategoryInUse {
                name: category.name,
                count,
            });
        }

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;

        self.storage.log_delete(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;
        info!(id = %category.id, name = %category.name, "category deleted");

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::TrackerPaths;
    use crate::models::{Money, Transaction};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_and_find() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = CategoryService::new(&storage, &settings);

        let created = service.create("  Groceries ", TransactionKind::Expense).unwrap();
        assert_eq!(created.name, "Groceries");

        let by_name = service.find("groceries", None).unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        let by_id = service.find(&created.id.to_string(), None).unwrap().unwrap();
        assert_eq!(by_id.id, created.id);
        let by_uuid = service
            .find(&created.id.as_uuid().to_string(), None)
            .unwrap()
            .unwrap();
        assert_eq!(by_uuid.id, created.id);

        assert!(service.find("nothing here", None).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_names_per_kind() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = CategoryService::new(&storage, &settings);

        service.create("Other", TransactionKind::Expense).unwrap();
        let err = service.create("OTHER", TransactionKind::Expense).unwrap_err();
        assert!(matches!(err, TrackerError::Duplicate { .. }));

        // Same name is fine for the other kind, but then lookups need a kind
        service.create("Other", TransactionKind::Income).unwrap();
        assert!(service.find("other", None).unwrap_err().is_validation());
        let income = service
            .find("other", Some(TransactionKind::Income))
            .unwrap()
            .unwrap();
        assert_eq!(income.kind, TransactionKind::Income);
    }

    #[test]
    fn test_name_validation() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings {
            max_category_name_length: 5,
            ..Settings::default()
        };
        let service = CategoryService::new(&storage, &settings);

        assert!(service.create("   ", TransactionKind::Expense).unwrap_err().is_validation());
        assert!(service
            .create("Entertainment", TransactionKind::Expense)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_list_by_kind() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = CategoryService::new(&storage, &settings);
        service.create("Food", TransactionKind::Expense).unwrap();
        service.create("Salary", TransactionKind::Income).unwrap();

        assert_eq!(service.list(None).unwrap().len(), 2);
        let income = service.list(Some(TransactionKind::Income)).unwrap();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].name, "Salary");
    }

    #[test]
    fn test_delete_rejected_while_in_use() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = CategoryService::new(&storage, &settings);
        let food = service.create("Food", TransactionKind::Expense).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let txn = Transaction::expense(Money::from_cents(100), date).with_category(food.id);
        let txn_id = txn.id;
        storage.transactions.upsert(txn).unwrap();

        let err = service.delete(food.id).unwrap_err();
        assert!(matches!(err, TrackerError::CategoryInUse { count: 1, .. }));

        storage.transactions.delete(txn_id).unwrap();
        service.delete(food.id).unwrap();
        assert!(service.get(food.id).unwrap().is_none());

        let entries = storage.audit().entries().unwrap();
        assert_eq!(entries.last().unwrap().operation, Operation::Delete);
    }

    #[test]
    fn test_resolve_missing_is_category_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let service = CategoryService::new(&storage, &settings);

        let err = service.resolve("Travel", None).unwrap_err();
        assert!(matches!(err, TrackerError::CategoryNotFound(ref name) if name == "Travel"));
    }
}
