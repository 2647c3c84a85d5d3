use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Lock, LockError, LockManager};

/// In-memory claim backed by `Mutex<bool>`.
#[derive(Debug, Default)]
pub struct InMemoryLock {
    held: Mutex<bool>,
}

impl InMemoryLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Lock for InMemoryLock {
    fn try_lock(&self) -> Result<bool, LockError> {
        let mut held = self
            .held
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if *held {
            Ok(false)
        } else {
            *held = true;
            Ok(true)
        }
    }

    fn unlock(&self) -> Result<(), LockError> {
        let mut held = self
            .held
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        if !*held {
            return Err(LockError::NotHeld("in-memory lock".into()));
        }
        *held = false;
        Ok(())
    }

    fn is_locked(&self) -> Result<bool, LockError> {
        self.held
            .lock()
            .map(|held| *held)
            .map_err(|e| LockError::Poisoned(e.to_string()))
    }
}

/// In-memory lock manager backed by a `HashMap<String, Arc<InMemoryLock>>`.
///
/// Locks are created lazily, one per id, and shared through `Arc`.
#[derive(Debug, Default)]
pub struct InMemoryLockManager {
    locks: Mutex<HashMap<String, Arc<InMemoryLock>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids with a live lock entry.
    pub fn len(&self) -> Result<usize, LockError> {
        self.locks
            .lock()
            .map(|locks| locks.len())
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))
    }

    pub fn is_empty(&self) -> Result<bool, LockError> {
        Ok(self.len()? == 0)
    }
}

impl LockManager for InMemoryLockManager {
    type Lock = InMemoryLock;

    fn get_lock(&self, id: &str) -> Result<Arc<InMemoryLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))?;
        Ok(locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(InMemoryLock::new()))
            .clone())
    }

    fn prune(&self, id: &str) -> Result<bool, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))?;
        let idle = match locks.get(id) {
            Some(lock) => Arc::strong_count(lock) == 1 && !lock.is_locked()?,
            None => false,
        };
        if idle {
            locks.remove(id);
        }
        Ok(idle)
    }
}
