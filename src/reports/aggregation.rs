//! Totals, counts and averages over a set of transactions
//!
//! [`aggregate`] is pure and exact: amounts are summed as integer cents and
//! groups are kept sorted by key, so the result never depends on the order
//! the transactions arrived in.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::models::{CategoryId, Money, Transaction, TransactionKind};

/// Dimension to bucket totals by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    None,
    Day,
    Category,
    Kind,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Day => "day",
            Self::Category => "category",
            Self::Kind => "kind",
        }
    }

    /// Bucket for one transaction, `None` when not grouping
    fn key_for(&self, txn: &Transaction) -> Option<GroupKey> {
        match self {
            Self::None => None,
            Self::Day => Some(GroupKey::Day(txn.date)),
            Self::Category => Some(
                txn.category_id
                    .map_or(GroupKey::Uncategorized, GroupKey::Category),
            ),
            Self::Kind => Some(GroupKey::Kind(txn.kind)),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "day" => Ok(Self::Day),
            "category" => Ok(Self::Category),
            "kind" | "type" => Ok(Self::Kind),
            other => Err(TrackerError::Validation(format!(
                "Unknown grouping: {}",
                other
            ))),
        }
    }
}

/// Identity of one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum GroupKey {
    Day(NaiveDate),
    Category(CategoryId),
    /// Transactions without a category when grouping by category
    Uncategorized,
    Kind(TransactionKind),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Category(id) => write!(f, "{}", id),
            Self::Uncategorized => f.write_str("Uncategorized"),
            Self::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

/// Sub-totals for one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub key: GroupKey,
    pub total_expense: Money,
    pub total_income: Money,
    pub count: usize,
}

impl GroupTotals {
    fn empty(key: GroupKey) -> Self {
        Self {
            key,
            total_expense: Money::zero(),
            total_income: Money::zero(),
            count: 0,
        }
    }

    fn add(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionKind::Expense => self.total_expense += txn.amount,
            TransactionKind::Income => self.total_income += txn.amount,
        }
        self.count += 1;
    }

    pub fn net(&self) -> Money {
        self.total_income - self.total_expense
    }

    /// Money moved in either direction
    pub fn total(&self) -> Money {
        self.total_expense + self.total_income
    }

    pub fn average(&self) -> Money {
        self.total().average(self.count)
    }
}

/// Totals for a set of transactions, optionally bucketed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub group_by: GroupBy,
    pub total_expense: Money,
    pub total_income: Money,
    /// `total_income - total_expense`
    pub net: Money,
    pub count: usize,
    pub expense_count: usize,
    pub income_count: usize,
    /// Sorted by key
    pub groups: Vec<GroupTotals>,
}

impl AggregationResult {
    /// The zeroed result for empty input
    pub fn empty(group_by: GroupBy) -> Self {
        Self {
            group_by,
            total_expense: Money::zero(),
            total_income: Money::zero(),
            net: Money::zero(),
            count: 0,
            expense_count: 0,
            income_count: 0,
            groups: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Look up one bucket
    pub fn group(&self, key: &GroupKey) -> Option<&GroupTotals> {
        self.groups
            .binary_search_by(|g| g.key.cmp(key))
            .ok()
            .map(|index| &self.groups[index])
    }

    pub fn average_expense(&self) -> Money {
        self.total_expense.average(self.expense_count)
    }

    pub fn average_income(&self) -> Money {
        self.total_income.average(self.income_count)
    }

    /// Expense buckets ordered largest first, for "top categories" views
    pub fn top_expenses(&self) -> Vec<&GroupTotals> {
        let mut groups: Vec<_> = self
            .groups
            .iter()
            .filter(|g| !g.total_expense.is_zero())
            .collect();
        groups.sort_by(|a, b| b.total_expense.cmp(&a.total_expense).then(a.key.cmp(&b.key)));
        groups
    }
}

/// Aggregate transactions, bucketing by `group_by`
pub fn aggregate(transactions: &[Transaction], group_by: GroupBy) -> AggregationResult {
    let mut result = AggregationResult::empty(group_by);
    let mut groups: BTreeMap<GroupKey, GroupTotals> = BTreeMap::new();

    for txn in transactions {
        match txn.kind {
            TransactionKind::Expense => {
                result.total_expense += txn.amount;
                result.expense_count += 1;
            }
            TransactionKind::Income => {
                result.total_income += txn.amount;
                result.income_count += 1;
            }
        }
        result.count += 1;

        if let Some(key) = group_by.key_for(txn) {
            groups
                .entry(key)
                .or_insert_with(|| GroupTotals::empty(key))
                .add(txn);
        }
    }

    result.net = result.total_income - result.total_expense;
    result.groups = groups.into_values().collect();
    result
}

/// A percentage that may not exist (zero baseline)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentChange {
    Defined(f64),
    Undefined,
}

impl PercentChange {
    /// `change` relative to `baseline`, in percent
    pub fn of(change: Money, baseline: Money) -> Self {
        change
            .percent_of(baseline)
            .map_or(Self::Undefined, Self::Defined)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(value) => Some(*value),
            Self::Undefined => None,
        }
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(value) => write!(f, "{:+.1}%", value),
            Self::Undefined => f.write_str("n/a"),
        }
    }
}

/// How a comparand differs from a baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDelta {
    /// `comparand.net - baseline.net`
    pub net_change: Money,
    /// `net_change / baseline.net * 100`, undefined for a zero baseline net
    pub percent_change: PercentChange,
    pub income_change: Money,
    pub income_percent_change: PercentChange,
    pub expense_change: Money,
    pub expense_percent_change: PercentChange,
}

/// Compare two aggregations; `baseline` is the reference point
pub fn compare(baseline: &AggregationResult, comparand: &AggregationResult) -> ComparisonDelta {
    let net_change = comparand.net - baseline.net;
    let income_change = comparand.total_income - baseline.total_income;
    let expense_change = comparand.total_expense - baseline.total_expense;

    ComparisonDelta {
        net_change,
        percent_change: PercentChange::of(net_change, baseline.net),
        income_change,
        income_percent_change: PercentChange::of(income_change, baseline.total_income),
        expense_change,
        expense_percent_change: PercentChange::of(expense_change, baseline.total_expense),
    }
}
