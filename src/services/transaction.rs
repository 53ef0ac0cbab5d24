//! Transaction service
//!
//! Validated create/update/delete of transactions plus lookup, listing and
//! search. Every mutation is saved immediately and written to the audit log.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use crate::audit::{AuditEntry, EntityType};
use crate::clock::Clock;
use crate::config::Settings;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{CategoryId, Money, Transaction, TransactionId, TransactionKind};
use crate::storage::{Storage, TransactionQuery};

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub kind: TransactionKind,
    pub amount: Money,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    /// `Some(None)` clears the category
    pub category_id: Option<Option<CategoryId>>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
    pub date: Option<NaiveDate>,
}

impl UpdateTransactionInput {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
    clock: &'a dyn Clock,
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn audit_label(txn: &Transaction) -> Option<String> {
    Some(match &txn.description {
        Some(description) => format!("{} {}", txn.date, description),
        None => txn.date.to_string(),
    })
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings, clock: &'a dyn Clock) -> Self {
        Self {
            storage,
            settings,
            clock,
        }
    }

    /// Create a new transaction
    pub fn create(&self, input: CreateTransactionInput) -> TrackerResult<Transaction> {
        let mut txn = Transaction::new(
            input.kind,
            input.amount,
            input.date.unwrap_or_else(|| self.clock.today()),
        );
        txn.category_id = input.category_id;
        txn.description = clean_description(input.description);

        self.validate(&txn)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            audit_label(&txn),
            &txn,
        )?;
        info!(id = %txn.id, kind = %txn.kind, amount = %txn.amount, "transaction created");

        Ok(txn)
    }

    /// Apply a partial update
    pub fn update(
        &self,
        id: TransactionId,
        input: UpdateTransactionInput,
    ) -> TrackerResult<Transaction> {
        let before = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| TrackerError::transaction_not_found(id.to_string()))?;

        let mut txn = before.clone();
        if let Some(kind) = input.kind {
            txn.kind = kind;
        }
        if let Some(amount) = input.amount {
            txn.amount = amount;
        }
        if let Some(category_id) = input.category_id {
            txn.category_id = category_id;
        }
        if let Some(description) = input.description {
            txn.description = clean_description(description);
        }
        if let Some(date) = input.date {
            txn.date = date;
        }

        if txn == before {
            return Ok(before);
        }

        txn.touch();
        self.validate(&txn)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            audit_label(&txn),
            &before,
            &txn,
        )?;
        info!(id = %txn.id, "transaction updated");

        Ok(txn)
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> TrackerResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .delete(id)?
            .ok_or_else(|| TrackerError::transaction_not_found(id.to_string()))?;
        self.storage.transactions.save()?;

        self.storage.log_delete(
            EntityType::Transaction,
            txn.id.to_string(),
            audit_label(&txn),
            &txn,
        )?;
        info!(id = %txn.id, "transaction deleted");

        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> TrackerResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find a transaction by full id, short tag or id prefix
    pub fn find(&self, reference: &str) -> TrackerResult<Option<Transaction>> {
        if let Ok(id) = reference.parse::<TransactionId>() {
            return self.storage.transactions.get(id);
        }

        let mut matches = self.storage.transactions.find_by_reference(reference)?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(TrackerError::Validation(format!(
                "'{}' matches {} transactions; use more of the id",
                reference.trim(),
                n
            ))),
        }
    }

    /// Like [`find`](Self::find) but a missing transaction is an error
    pub fn resolve(&self, reference: &str) -> TrackerResult<Transaction> {
        self.find(reference)?
            .ok_or_else(|| TrackerError::transaction_not_found(reference.trim()))
    }

    /// Audit trail of one transaction, oldest first
    pub fn history(&self, id: TransactionId) -> TrackerResult<Vec<AuditEntry>> {
        self.storage
            .audit()
            .history(EntityType::Transaction, &id.to_string())
    }

    /// Transactions matching a query, newest first
    pub fn list(&self, query: &TransactionQuery) -> TrackerResult<Vec<Transaction>> {
        self.storage.transactions.query(query)
    }

    /// Case-insensitive substring search over descriptions and category names
    pub fn search(&self, term: &str, limit: Option<usize>) -> TrackerResult<Vec<Transaction>> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Err(TrackerError::Validation("Search term cannot be empty".into()));
        }

        let category_names: HashMap<CategoryId, String> = self
            .storage
            .categories
            .get_all()?
            .into_iter()
            .map(|c| (c.id, c.name.to_lowercase()))
            .collect();

        let mut results: Vec<_> = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .filter(|txn| {
                let in_description = txn
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term));
                let in_category = txn
                    .category_id
                    .and_then(|id| category_names.get(&id))
                    .is_some_and(|name| name.contains(&term));
                in_description || in_category
            })
            .collect();

        if let Some(limit) = limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    pub fn count(&self) -> TrackerResult<usize> {
        self.storage.transactions.count()
    }

    fn validate(&self, txn: &Transaction) -> TrackerResult<()> {
        txn.validate(self.settings.max_description_length)
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        if txn.amount > self.settings.max_amount {
            return Err(TrackerError::Validation(format!(
                "Amount {} exceeds the maximum of {}",
                txn.amount.format_with_symbol(&self.settings.currency_symbol),
                self.settings
                    .max_amount
                    .format_with_symbol(&self.settings.currency_symbol)
            )));
        }

        if let Some(category_id) = txn.category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .ok_or_else(|| TrackerError::CategoryNotFound(category_id.to_string()))?;
            if category.kind != txn.kind {
                return Err(TrackerError::Validation(format!(
                    "Category '{}' is for {} transactions, not {}",
                    category.name, category.kind, txn.kind
                )));
            }
        }

        Ok(())
    }
}
