//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json, with an
//! in-memory index from category to transaction ids.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::TrackerResult;
use crate::models::{CategoryId, Transaction, TransactionId};

use super::data_file::DataFile;
use super::query::TransactionQuery;
use super::{read_lock, write_lock};

/// On-disk layout of transactions.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    file: DataFile,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: category_id -> transaction_ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

/// Newest first; ties broken by creation time so the order is stable
fn newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: DataFile::new(path),
            data: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and rebuild the index
    pub fn load(&self) -> TrackerResult<()> {
        let file_data: TransactionData = self.file.load()?;

        let mut data = write_lock(&self.data)?;
        let mut by_category = write_lock(&self.by_category)?;
        data.clear();
        by_category.clear();

        for txn in file_data.transactions {
            if let Some(category_id) = txn.category_id {
                by_category.entry(category_id).or_default().push(txn.id);
            }
            data.insert(txn.id, txn);
        }

        tracing::debug!(
            count = data.len(),
            path = %self.file.path().display(),
            "loaded transactions"
        );
        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> TrackerResult<()> {
        let data = read_lock(&self.data)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        newest_first(&mut transactions);

        self.file.save(&TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> TrackerResult<Option<Transaction>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// All transactions, newest first
    pub fn get_all(&self) -> TrackerResult<Vec<Transaction>> {
        self.query(&TransactionQuery::new())
    }

    /// Transactions passing the query filters, newest first, truncated to its limit
    pub fn query(&self, query: &TransactionQuery) -> TrackerResult<Vec<Transaction>> {
        let data = read_lock(&self.data)?;

        let mut transactions: Vec<_> = match query.category_id {
            Some(category_id) => {
                let by_category = read_lock(&self.by_category)?;
                by_category
                    .get(&category_id)
                    .map(|ids| ids.as_slice())
                    .unwrap_or(&[])
                    .iter()
                    .filter_map(|id| data.get(id))
                    .filter(|txn| query.matches(txn))
                    .cloned()
                    .collect()
            }
            None => data
                .values()
                .filter(|txn| query.matches(txn))
                .cloned()
                .collect(),
        };

        newest_first(&mut transactions);
        if let Some(limit) = query.limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    /// Transactions whose id matches a user-typed reference
    pub fn find_by_reference(&self, reference: &str) -> TrackerResult<Vec<Transaction>> {
        let data = read_lock(&self.data)?;
        Ok(data
            .values()
            .filter(|txn| txn.id.matches_reference(reference))
            .cloned()
            .collect())
    }

    /// Number of transactions tagged with a category
    pub fn count_by_category(&self, category_id: CategoryId) -> TrackerResult<usize> {
        Ok(read_lock(&self.by_category)?
            .get(&category_id)
            .map_or(0, Vec::len))
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> TrackerResult<()> {
        let mut data = write_lock(&self.data)?;
        let mut by_category = write_lock(&self.by_category)?;

        if let Some(old_category) = data.get(&txn.id).and_then(|old| old.category_id) {
            if let Some(ids) = by_category.get_mut(&old_category) {
                ids.retain(|&id| id != txn.id);
            }
        }
        if let Some(category_id) = txn.category_id {
            by_category.entry(category_id).or_default().push(txn.id);
        }

        data.insert(txn.id, txn);
        Ok(())
    }

    /// Remove a transaction, returning it if it existed
    pub fn delete(&self, id: TransactionId) -> TrackerResult<Option<Transaction>> {
        let mut data = write_lock(&self.data)?;
        let mut by_category = write_lock(&self.by_category)?;

        let removed = data.remove(&id);
        if let Some(category_id) = removed.as_ref().and_then(|txn| txn.category_id) {
            if let Some(ids) = by_category.get_mut(&category_id) {
                ids.retain(|&tid| tid != id);
            }
        }
        Ok(removed)
    }

    pub fn count(&self) -> TrackerResult<usize> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateInterval, Money, TransactionKind};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = Transaction::expense(Money::from_cents(5000), day(15));
        let id = txn.id;

        repo.upsert(txn).unwrap();

        assert_eq!(repo.get(id).unwrap().unwrap().amount.cents(), 5000);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let category = CategoryId::new();
        let txn = Transaction::expense(Money::from_cents(5000), day(15)).with_category(category);
        let id = txn.id;

        repo.upsert(txn).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 1);
        assert_eq!(reloaded.get(id).unwrap().unwrap().category_id, Some(category));
        assert_eq!(reloaded.count_by_category(category).unwrap(), 1);
    }

    #[test]
    fn test_query_orders_newest_first_and_limits() {
        let (_temp_dir, repo) = create_test_repo();
        for d in [3, 1, 2] {
            repo.upsert(Transaction::expense(Money::from_cents(100), day(d)))
                .unwrap();
        }

        let dates: Vec<_> = repo.get_all().unwrap().iter().map(|t| t.date).collect();
        assert_eq!(dates, [day(3), day(2), day(1)]);

        let limited = repo.query(&TransactionQuery::new().limit(2)).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].date, day(3));
    }

    #[test]
    fn test_query_by_interval_and_kind() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Transaction::expense(Money::from_cents(100), day(10))).unwrap();
        repo.upsert(Transaction::income(Money::from_cents(200), day(15))).unwrap();
        repo.upsert(Transaction::expense(Money::from_cents(300), day(20))).unwrap();

        let window = DateInterval::new(day(12), day(20)).unwrap();
        let in_window = repo.query(&TransactionQuery::new().within(window)).unwrap();
        assert_eq!(in_window.len(), 2);

        let expenses = repo
            .query(&TransactionQuery::new().within(window).kind(TransactionKind::Expense))
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount.cents(), 300);
    }

    #[test]
    fn test_recategorizing_moves_index() {
        let (_temp_dir, repo) = create_test_repo();
        let (food, travel) = (CategoryId::new(), CategoryId::new());
        let mut txn = Transaction::expense(Money::from_cents(100), day(1)).with_category(food);

        repo.upsert(txn.clone()).unwrap();
        txn.category_id = Some(travel);
        repo.upsert(txn).unwrap();

        assert_eq!(repo.count_by_category(food).unwrap(), 0);
        assert_eq!(
            repo.query(&TransactionQuery::new().category(travel)).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let category = CategoryId::new();
        let txn = Transaction::expense(Money::from_cents(5000), day(15)).with_category(category);
        let id = txn.id;
        repo.upsert(txn).unwrap();

        assert!(repo.delete(id).unwrap().is_some());
        assert!(repo.delete(id).unwrap().is_none());
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(repo.count_by_category(category).unwrap(), 0);
    }

    #[test]
    fn test_find_by_reference() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = Transaction::expense(Money::from_cents(5000), day(15));
        let short = txn.id.to_string();
        repo.upsert(txn).unwrap();

        assert_eq!(repo.find_by_reference(&short).unwrap().len(), 1);
        assert!(repo.find_by_reference("txn-zzzz").unwrap().is_empty());
    }
}
