//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::TrackerResult;
use crate::models::{Category, CategoryId, TransactionKind};

use super::data_file::DataFile;
use super::{read_lock, write_lock};

/// On-disk layout of categories.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    file: DataFile,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

fn by_kind_then_name(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: DataFile::new(path),
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> TrackerResult<()> {
        let file_data: CategoryData = self.file.load()?;

        let mut categories = write_lock(&self.categories)?;
        categories.clear();
        categories.extend(file_data.categories.into_iter().map(|c| (c.id, c)));

        tracing::debug!(count = categories.len(), "loaded categories");
        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> TrackerResult<()> {
        let mut list: Vec<_> = read_lock(&self.categories)?.values().cloned().collect();
        by_kind_then_name(&mut list);

        self.file.save(&CategoryData { categories: list })
    }

    pub fn get(&self, id: CategoryId) -> TrackerResult<Option<Category>> {
        Ok(read_lock(&self.categories)?.get(&id).cloned())
    }

    /// All categories, expenses before income, then by name
    pub fn get_all(&self) -> TrackerResult<Vec<Category>> {
        let mut list: Vec<_> = read_lock(&self.categories)?.values().cloned().collect();
        by_kind_then_name(&mut list);
        Ok(list)
    }

    /// Case-insensitive name lookup, optionally within one kind
    pub fn get_by_name(
        &self,
        name: &str,
        kind: Option<TransactionKind>,
    ) -> TrackerResult<Vec<Category>> {
        let mut matches: Vec<_> = read_lock(&self.categories)?
            .values()
            .filter(|c| c.has_name(name) && kind.map_or(true, |k| c.kind == k))
            .cloned()
            .collect();
        by_kind_then_name(&mut matches);
        Ok(matches)
    }

    /// Categories whose id matches a user-typed reference
    pub fn find_by_reference(&self, reference: &str) -> TrackerResult<Vec<Category>> {
        Ok(read_lock(&self.categories)?
            .values()
            .filter(|c| c.id.matches_reference(reference))
            .cloned()
            .collect())
    }

    /// Insert or update a category
    pub fn upsert(&self, category: Category) -> TrackerResult<()> {
        write_lock(&self.categories)?.insert(category.id, category);
        Ok(())
    }

    /// Remove a category, returning it if it existed
    pub fn delete(&self, id: CategoryId) -> TrackerResult<Option<Category>> {
        Ok(write_lock(&self.categories)?.remove(&id))
    }

    pub fn count(&self) -> TrackerResult<usize> {
        Ok(read_lock(&self.categories)?.len())
    }
}
