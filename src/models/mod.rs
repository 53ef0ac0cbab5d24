//! Core data models
//!
//! Transactions, categories, money amounts and date intervals. These are
//! plain values; persistence lives in `storage` and business rules in
//! `services`.

pub mod category;
pub mod ids;
pub mod interval;
pub mod money;
pub mod transaction;

pub use category::{default_categories, Category, CategoryValidationError};
pub use ids::{CategoryId, TransactionId};
pub use interval::{DateInterval, PeriodUnit};
pub use money::{Money, MoneyParseError};
pub use transaction::{Transaction, TransactionKind, TransactionValidationError};
