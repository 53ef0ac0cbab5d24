//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer and the report
//! builder.

pub mod category;
pub mod config;
pub mod report;
pub mod transaction;

pub use category::{handle_category_command, CategoryCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use report::{handle_report_command, OutputArgs, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
