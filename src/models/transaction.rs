//! Transaction model
//!
//! A transaction is a dated, positive amount that is either an expense or an
//! income. The direction lives in [`TransactionKind`], never in the sign of
//! the amount.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId};
use super::money::Money;

/// Whether money left or arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn all() -> &'static [Self] {
        &[Self::Expense, Self::Income]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// Sign marker used when rendering amounts of this kind
    pub fn sign(&self) -> char {
        match self {
            Self::Expense => '-',
            Self::Income => '+',
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = TransactionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" | "e" | "out" => Ok(Self::Expense),
            "income" | "i" | "in" => Ok(Self::Income),
            other => Err(TransactionValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// A recorded money movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Expense or income
    pub kind: TransactionKind,

    /// Always positive
    pub amount: Money,

    /// Category (None means uncategorized)
    pub category_id: Option<CategoryId>,

    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Calendar day the money moved
    pub date: NaiveDate,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new uncategorized transaction
    pub fn new(kind: TransactionKind, amount: Money, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            category_id: None,
            description: None,
            date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Convenience constructor for an expense
    pub fn expense(amount: Money, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Expense, amount, date)
    }

    /// Convenience constructor for an income
    pub fn income(amount: Money, date: NaiveDate) -> Self {
        Self::new(TransactionKind::Income, amount, date)
    }

    /// Builder-style category assignment
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Builder-style description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Amount with the kind applied: negative for expenses
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Expense => -self.amount,
            TransactionKind::Income => self.amount,
        }
    }

    /// Record a modification
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Check model invariants; `max_description` bounds the note length
    pub fn validate(&self, max_description: usize) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        if let Some(description) = &self.description {
            let len = description.chars().count();
            if len > max_description {
                return Err(TransactionValidationError::DescriptionTooLong {
                    len,
                    max: max_description,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {}{}",
            self.date.format("%Y-%m-%d"),
            self.kind.sign(),
            self.amount
        )?;
        if let Some(description) = &self.description {
            write!(f, " - {}", description)?;
        }
        Ok(())
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    DescriptionTooLong { len: usize, max: usize },
    UnknownKind(String),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero (got {})", amount)
            }
            Self::DescriptionTooLong { len, max } => {
                write!(f, "Description too long ({} characters, max {})", len, max)
            }
            Self::UnknownKind(kind) => {
                write!(f, "Unknown transaction type '{}' (use expense or income)", kind)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}
