//! Transaction CLI commands

use std::collections::HashMap;

use chrono::NaiveDate;
use clap::Subcommand;

use crate::clock::Clock;
use crate::config::Settings;
use crate::dates::{format_with, DateResolver};
use crate::display::{format_audit_lines, format_transaction_details, format_transaction_table};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{CategoryId, Money, TransactionKind};
use crate::services::{
    CategoryService, CreateTransactionInput, TransactionService, UpdateTransactionInput,
};
use crate::storage::{Storage, TransactionQuery};

/// Transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Record a new transaction
    Add {
        /// Amount (e.g., "12.50"); always positive
        amount: String,
        /// Expense or income
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionKind,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Free-form note
        #[arg(short = 'm', long)]
        description: Option<String>,
        /// Date or date expression ("yesterday", "3 days ago"); defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Date expression or range ("this month", "2024-01-01 to 2024-03-31")
        #[arg(short, long)]
        range: Option<String>,
        /// Only expenses or only income
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show transaction details
    Show {
        /// Transaction ID or ID prefix
        id: String,
    },

    /// Change fields of a transaction
    Edit {
        /// Transaction ID or ID prefix
        id: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
        /// Category name or ID
        #[arg(short, long, conflicts_with = "clear_category")]
        category: Option<String>,
        /// Remove the category
        #[arg(long)]
        clear_category: bool,
        #[arg(short = 'm', long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
        /// Date or date expression
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID or ID prefix
        id: String,
    },

    /// Search descriptions and category names
    Search {
        term: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    clock: &dyn Clock,
    cmd: TransactionCommands,
) -> TrackerResult<()> {
    let service = TransactionService::new(storage, settings, clock);
    let categories = CategoryService::new(storage, settings);

    match cmd {
        TransactionCommands::Add {
            amount,
            kind,
            category,
            description,
            date,
        } => {
            let amount = parse_amount(&amount)?;
            let category_id = category
                .map(|c| categories.resolve(&c, Some(kind)))
                .transpose()?
                .map(|c| c.id);
            let date = date.map(|d| resolve_day(clock, &d)).transpose()?;

            let txn = service.create(CreateTransactionInput {
                kind,
                amount,
                category_id,
                description,
                date,
            })?;

            println!(
                "Recorded {} of {} on {}",
                txn.kind.as_str(),
                txn.amount.format_with_symbol(&settings.currency_symbol),
                format_with(txn.date, &settings.date_format)
            );
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List {
            range,
            kind,
            category,
            limit,
        } => {
            let mut query =
                TransactionQuery::new().limit(limit.unwrap_or(settings.default_list_limit));
            if let Some(range) = range {
                query = query.within(DateResolver::new(clock).resolve_interval(&range)?);
            }
            if let Some(kind) = kind {
                query = query.kind(kind);
            }
            if let Some(category) = category {
                query = query.category(categories.resolve(&category, kind)?.id);
            }

            let transactions = service.list(&query)?;
            let names = category_names(&categories)?;
            println!(
                "{}",
                format_transaction_table(&transactions, &names, settings)
            );
        }

        TransactionCommands::Show { id } => {
            let txn = service.resolve(&id)?;
            let category = txn
                .category_id
                .map(|id| categories.get(id))
                .transpose()?
                .flatten();
            print!(
                "{}",
                format_transaction_details(
                    &txn,
                    category.as_ref().map(|c| c.name.as_str()),
                    settings,
                    clock.today()
                )
            );

            let history = service.history(txn.id)?;
            if !history.is_empty() {
                println!();
                println!("History:");
                print!("{}", format_audit_lines(&history));
            }
        }

        TransactionCommands::Edit {
            id,
            amount,
            kind,
            category,
            clear_category,
            description,
            clear_description,
            date,
        } => {
            let txn = service.resolve(&id)?;
            let effective_kind = kind.unwrap_or(txn.kind);

            let input = UpdateTransactionInput {
                kind,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                category_id: if clear_category {
                    Some(None)
                } else {
                    category
                        .map(|c| categories.resolve(&c, Some(effective_kind)))
                        .transpose()?
                        .map(|c| Some(c.id))
                },
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                date: date.map(|d| resolve_day(clock, &d)).transpose()?,
            };

            if input.is_empty() {
                println!(
                    "No changes specified. Use --amount, --type, --category, --description or --date."
                );
                return Ok(());
            }

            let updated = service.update(txn.id, input)?;
            println!("Updated transaction: {}", updated.id);
        }

        TransactionCommands::Delete { id } => {
            let txn = service.resolve(&id)?;
            service.delete(txn.id)?;
            println!("Deleted transaction: {}", txn.id);
        }

        TransactionCommands::Search { term, limit } => {
            let transactions = service.search(&term, limit)?;
            let names = category_names(&categories)?;
            println!(
                "{}",
                format_transaction_table(&transactions, &names, settings)
            );
        }
    }

    Ok(())
}

fn parse_amount(text: &str) -> TrackerResult<Money> {
    Money::parse(text)
        .map_err(|e| TrackerError::Validation(format!("Invalid amount: {}", e)))
}

/// Resolve a date option that must name a single day
fn resolve_day(clock: &dyn Clock, text: &str) -> TrackerResult<NaiveDate> {
    let resolved = DateResolver::new(clock).resolve(text)?;
    resolved.as_day().ok_or_else(|| {
        TrackerError::Validation(format!(
            "'{}' covers {}; a transaction needs a single day",
            text.trim(),
            resolved
        ))
    })
}

fn category_names(service: &CategoryService<'_>) -> TrackerResult<HashMap<CategoryId, String>> {
    Ok(service
        .list(None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}
