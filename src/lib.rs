//! Expense Tracker - daily expense and income tracking with period reports
//!
//! Transactions and categories are stored as JSON files; the reporting core
//! turns human date phrases ("last month", "3 days ago", "01/13/2023") into
//! intervals and aggregates the matching transactions.
//!
//! # Architecture
//!
//! - `clock`: injectable source of "today"
//! - `config`: paths and settings
//! - `dates`: date expression resolution, period arithmetic, formatting
//! - `models`: transactions, categories, money, ids, intervals
//! - `storage`: JSON file storage and the `TransactionStore` seam
//! - `audit`: JSONL audit log of every mutation
//! - `services`: validated create/update/delete and lookups
//! - `reports`: aggregation, comparison and the report builder
//! - `display` / `export`: terminal rendering and file formats
//! - `cli`: clap command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_tracker::clock::SystemClock;
//! use expense_tracker::config::TrackerPaths;
//! use expense_tracker::reports::{ReportBuilder, ReportRequest};
//! use expense_tracker::storage::Storage;
//!
//! let storage = Storage::open(TrackerPaths::new()?)?;
//! let report = ReportBuilder::new(&storage, &SystemClock)
//!     .build(&ReportRequest::Monthly { anchor: Some("last month".into()) })?;
//! ```

pub mod audit;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dates;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

use std::sync::Once;

pub use error::{TrackerError, TrackerResult};

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber, writing to stderr
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
