use std::fmt;

use crate::lock::LockError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A write raced another writer on the same id. `expected` is the version
    /// the caller based its write on; `None` when the id was claimed by
    /// another writer at the time of the call.
    Conflict {
        id: String,
        expected: Option<u64>,
        actual: u64,
    },
    /// The id (or the requested parent) is not visible at head.
    NotFound(String),
    /// Attaching `id` under `parent` would make the tree cyclic.
    InvalidParent { id: String, parent: String },
    /// Read requested at a version that has not been committed yet.
    InvalidVersion { requested: u64, head: u64 },
    /// Snapshot contents do not form a valid version log.
    InvalidLog(String),
    LockPoisoned(&'static str),
    /// The per-id claim could not be taken or released.
    Claim(LockError),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict {
                id,
                expected: Some(expected),
                actual,
            } => write!(
                f,
                "concurrent write detected for node {} (expected version {}, got {})",
                id, expected, actual
            ),
            StoreError::Conflict {
                id,
                expected: None,
                actual,
            } => write!(
                f,
                "concurrent write detected for node {} (another writer holds it at version {})",
                id, actual
            ),
            StoreError::NotFound(id) => write!(f, "node not found: {}", id),
            StoreError::InvalidParent { id, parent } => {
                write!(f, "cannot attach {} under {}: would create a cycle", id, parent)
            }
            StoreError::InvalidVersion { requested, head } => write!(
                f,
                "version {} is not committed (head is {})",
                requested, head
            ),
            StoreError::InvalidLog(message) => write!(f, "invalid version log: {}", message),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::Claim(e) => write!(f, "write claim failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Claim(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LockError> for StoreError {
    fn from(err: LockError) -> Self {
        StoreError::Claim(err)
    }
}
