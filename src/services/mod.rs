//! Service layer
//!
//! Business rules on top of the storage layer: validation, lookups by
//! name or short id, and audit logging of every mutation.

pub mod category;
pub mod transaction;

pub use category::CategoryService;
pub use transaction::{CreateTransactionInput, TransactionService, UpdateTransactionInput};
