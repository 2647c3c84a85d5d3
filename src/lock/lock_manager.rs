use std::sync::Arc;

use super::{Lock, LockError};

/// Hands out one lock per node id.
pub trait LockManager: Send + Sync {
    type Lock: Lock;

    /// Get (or create) the lock for `id`. Repeated calls with the same id
    /// return the same logical lock.
    fn get_lock(&self, id: &str) -> Result<Arc<Self::Lock>, LockError>;

    /// Forget the lock for `id` when nobody holds it or references it.
    /// Returns whether an entry was dropped.
    fn prune(&self, id: &str) -> Result<bool, LockError>;
}
