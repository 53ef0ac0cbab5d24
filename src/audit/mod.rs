//! Append-only audit trail
//!
//! Every create, update and delete performed through the services is
//! recorded as one JSON line holding the operation, the entity and its
//! before/after snapshots. Updates also carry a short field-level summary
//! produced by [`summarize_changes`].

mod diff;
mod entry;
mod log;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use log::AuditLog;
