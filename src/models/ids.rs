//! Strongly-typed ID wrappers
//!
//! Transactions and categories are keyed by UUIDs wrapped in newtypes so the
//! two can never be mixed up. The display form is a short prefixed tag
//! (`txn-1a2b3c4d`) which the services also accept as a lookup key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Prefix used in the short display form
            pub const fn prefix() -> &'static str {
                $display_prefix
            }

            /// Whether a user-typed reference (full UUID, short tag, or a
            /// leading fragment of either) points at this ID
            pub fn matches_reference(&self, reference: &str) -> bool {
                let reference = reference.trim().to_lowercase();
                let reference = reference
                    .strip_prefix($display_prefix)
                    .unwrap_or(reference.as_str());
                let simple = self.0.simple().to_string();
                let hyphenated = self.0.to_string();
                reference.len() >= 4
                    && (hyphenated.starts_with(reference) || simple.starts_with(reference))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let simple = self.0.simple().to_string();
                write!(f, "{}{}", $display_prefix, &simple[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(TransactionId, "txn-");
define_id!(CategoryId, "cat-");
