use std::fmt;

/// Error type for lock operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The underlying lock primitive was poisoned (a thread panicked while holding it).
    Poisoned(String),
    /// Released a lock that was not held.
    NotHeld(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::Poisoned(msg) => write!(f, "lock poisoned: {}", msg),
            LockError::NotHeld(id) => write!(f, "lock not held: {}", id),
        }
    }
}

impl std::error::Error for LockError {}
