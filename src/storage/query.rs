//! Transaction query filters

use crate::models::{CategoryId, DateInterval, Transaction, TransactionKind};

/// Which transactions to fetch from a store
///
/// The default query matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Inclusive date bounds
    pub interval: DateInterval,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<CategoryId>,
    /// Maximum number of rows, newest first
    pub limit: Option<usize>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            interval: DateInterval::all_time(),
            kind: None,
            category_id: None,
            limit: None,
        }
    }
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an interval
    pub fn within(mut self, interval: DateInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a transaction passes every filter except the limit
    pub fn matches(&self, txn: &Transaction) -> bool {
        self.interval.contains(txn.date)
            && self.kind.map_or(true, |kind| txn.kind == kind)
            && self
                .category_id
                .map_or(true, |id| txn.category_id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_default_matches_everything() {
        let txn = Transaction::income(Money::from_cents(100), day(1));
        assert!(TransactionQuery::new().matches(&txn));
    }

    #[test]
    fn test_filters_combine() {
        let category = CategoryId::new();
        let query = TransactionQuery::new()
            .within(DateInterval::new(day(1), day(10)).unwrap())
            .kind(TransactionKind::Expense)
            .category(category);

        let hit = Transaction::expense(Money::from_cents(100), day(10)).with_category(category);
        let late = Transaction::expense(Money::from_cents(100), day(11)).with_category(category);
        let income = Transaction::income(Money::from_cents(100), day(5)).with_category(category);
        let uncategorized = Transaction::expense(Money::from_cents(100), day(5));

        assert!(query.matches(&hit));
        assert!(!query.matches(&late));
        assert!(!query.matches(&income));
        assert!(!query.matches(&uncategorized));
    }
}
