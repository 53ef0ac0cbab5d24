//! Category model
//!
//! Categories belong to exactly one kind; an expense category cannot tag an
//! income and vice versa. Names are unique within a kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::transaction::TransactionKind;

/// A label for grouping transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// Which transactions may use this category
    pub kind: TransactionKind,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive name comparison used for uniqueness and lookup
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }

    /// Validate the category; `max_name` bounds the name length
    pub fn validate(&self, max_name: usize) -> Result<(), CategoryValidationError> {
        let len = self.name.trim().chars().count();
        if len == 0 {
            return Err(CategoryValidationError::EmptyName);
        }

        if len > max_name {
            return Err(CategoryValidationError::NameTooLong { len, max: max_name });
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Categories created on first run
pub fn default_categories() -> Vec<Category> {
    const EXPENSES: &[&str] = &[
        "Food & Dining",
        "Transportation",
        "Shopping",
        "Entertainment",
        "Bills & Utilities",
        "Healthcare",
        "Education",
        "Travel",
        "Personal Care",
        "Other Expenses",
    ];
    const INCOME: &[&str] = &[
        "Salary",
        "Freelance",
        "Business",
        "Investment",
        "Gift",
        "Other Income",
    ];

    EXPENSES
        .iter()
        .map(|name| Category::new(*name, TransactionKind::Expense))
        .chain(
            INCOME
                .iter()
                .map(|name| Category::new(*name, TransactionKind::Income)),
        )
        .collect()
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong { len: usize, max: usize },
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong { len, max } => {
                write!(f, "Category name too long ({} characters, max {})", len, max)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
