//! Identifiers for workflows, runs, and indexed chunks.
//!
//! IDs are ULIDs rendered with a short type prefix (`wf_…`, `run_…`, `doc_…`), so they
//! sort by creation time and stay recognisable in logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Declares a ULID-backed ID type that displays as `<prefix>_<ulid>`.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Display prefix, without the underscore.
            pub const PREFIX: &'static str = $prefix;

            /// Generates a fresh ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Ulid> for $name {
            fn from(ulid: Ulid) -> Self {
                Self(ulid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        /// Accepts both the prefixed form and a bare ULID.
        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                raw.parse::<Ulid>().map(Self).map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    reason: e.to_string(),
                })
            }
        }
    };
}

define_id!(
    /// A stored workflow definition.
    WorkflowId,
    "wf"
);

define_id!(
    /// One execution of a workflow.
    WorkflowRunId,
    "run"
);

define_id!(
    /// A document chunk held by a knowledge index.
    DocumentId,
    "doc"
);

impl WorkflowId {
    /// Wraps a sequential database key.
    ///
    /// The number occupies the low bits of the ULID, so the same key always
    /// yields the same ID and distinct keys never collide.
    #[must_use]
    pub fn from_number(key: u64) -> Self {
        Self(Ulid::from(u128::from(key)))
    }

    /// Returns the database key this ID was made from, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        u64::try_from(u128::from(self.0)).ok()
    }
}
