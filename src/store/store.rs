use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;

use crate::lock::{InMemoryLock, InMemoryLockManager, Lock, LockManager};
use crate::node::{Node, Payload};

use super::error::StoreError;
use super::journal::Log;
use super::view::{Traversal, View};

/// Versioned content store.
///
/// Writes append to a single version log under one exclusive section; every
/// committed write takes the next store-wide version. Concurrent writers on
/// the same id are rejected with [`StoreError::Conflict`] instead of being
/// queued. Reads go through a [`View`] pinned to a committed version.
///
/// Clone-friendly: clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct Store {
    log: Arc<RwLock<Log>>,
    claims: Arc<InMemoryLockManager>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a full version log (oldest first).
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, StoreError> {
        Ok(Store {
            log: Arc::new(RwLock::new(Log::from_nodes(nodes)?)),
            claims: Arc::new(InMemoryLockManager::new()),
        })
    }

    /// Every committed version, oldest first.
    pub fn export(&self) -> Result<Vec<Node>, StoreError> {
        let log = self.read_log()?;
        Ok(log.nodes().iter().map(|node| node.as_ref().clone()).collect())
    }

    pub fn head(&self) -> Result<u64, StoreError> {
        Ok(self.read_log()?.head())
    }

    /// Number of distinct ids ever written.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read_log()?.id_count())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// A read transaction pinned to `at`, or to head when `None`.
    pub fn view(&self, at: Option<u64>) -> Result<View, StoreError> {
        let head = self.head()?;
        let at = match at {
            Some(requested) if requested > head => {
                return Err(StoreError::InvalidVersion { requested, head })
            }
            Some(requested) => requested,
            None => head,
        };
        Ok(View::new(self.log.clone(), at))
    }

    /// A read transaction pinned to head.
    pub fn read(&self) -> Result<View, StoreError> {
        self.view(None)
    }

    pub fn get(&self, id: &str, at: Option<u64>) -> Result<Option<Node>, StoreError> {
        self.view(at)?.get(id)
    }

    pub fn children(&self, id: &str, at: Option<u64>) -> Result<Vec<Node>, StoreError> {
        self.view(at)?.children(id)
    }

    pub fn all(&self, at: Option<u64>) -> Result<Traversal, StoreError> {
        self.view(at)?.all()
    }

    pub fn path(&self, id: &str, at: Option<u64>) -> Result<Option<String>, StoreError> {
        self.view(at)?.path(id)
    }

    /// Every version of `id`, tombstones included, oldest first.
    pub fn history(&self, id: &str) -> Result<Vec<Node>, StoreError> {
        Ok(self.read_log()?.history(id))
    }

    /// Append a new version of `id` on top of the version current when the
    /// call starts. Fails with `Conflict` while another writer holds `id`, or
    /// when another writer commits to `id` first.
    pub fn put(
        &self,
        id: &str,
        parent_id: Option<&str>,
        payload: Payload,
    ) -> Result<u64, StoreError> {
        let base = self.read_log()?.latest_version(id);
        let claim = self.claim(id)?;
        claim.put_if(base, parent_id, payload)
    }

    /// Optimistic write: succeeds only when the latest version of `id` is
    /// `expected` (0 means `id` must not exist yet).
    pub fn put_if(
        &self,
        id: &str,
        expected: u64,
        parent_id: Option<&str>,
        payload: Payload,
    ) -> Result<u64, StoreError> {
        let claim = self.claim(id)?;
        claim.put_if(expected, parent_id, payload)
    }

    /// Append a tombstone for `id`. Fails with `NotFound` when `id` is not
    /// visible at head.
    pub fn delete(&self, id: &str) -> Result<u64, StoreError> {
        let claim = self.claim(id)?;
        claim.delete()
    }

    /// Reserve `id` for this writer until the returned claim is dropped.
    pub fn claim(&self, id: &str) -> Result<WriteClaim<'_>, StoreError> {
        let lock = self.claims.get_lock(id)?;
        if !lock.try_lock()? {
            drop(lock);
            self.claims.prune(id)?;
            let actual = self.read_log()?.latest_version(id);
            debug!("event=claim_rejected module=store id={} version={}", id, actual);
            return Err(StoreError::Conflict {
                id: id.to_string(),
                expected: None,
                actual,
            });
        }
        Ok(WriteClaim {
            store: self,
            id: id.to_string(),
            lock: Some(lock),
        })
    }

    fn read_log(&self) -> Result<RwLockReadGuard<'_, Log>, StoreError> {
        self.log
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))
    }

    fn write_log(&self) -> Result<RwLockWriteGuard<'_, Log>, StoreError> {
        self.log
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))
    }

    fn append(
        &self,
        id: &str,
        expected: Option<u64>,
        parent_id: Option<&str>,
        payload: Payload,
    ) -> Result<u64, StoreError> {
        let mut log = self.write_log()?;
        let actual = log.latest_version(id);
        if let Some(expected) = expected {
            if expected != actual {
                return Err(StoreError::Conflict {
                    id: id.to_string(),
                    expected: Some(expected),
                    actual,
                });
            }
        }

        if let Some(parent) = parent_id {
            let head = log.head();
            if log.visible_at(parent, head).is_none() {
                return Err(StoreError::NotFound(parent.to_string()));
            }
            if log.has_ancestor(parent, id) {
                return Err(StoreError::InvalidParent {
                    id: id.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        let version = log.head() + 1;
        log.push(Node::new(
            id,
            version,
            parent_id.map(str::to_string),
            payload,
        ));
        debug!("event=node_put module=store id={} version={}", id, version);
        Ok(version)
    }

    fn append_tombstone(&self, id: &str) -> Result<u64, StoreError> {
        let mut log = self.write_log()?;
        let head = log.head();
        let parent_id = match log.visible_at(id, head) {
            Some(node) => node.parent_id.clone(),
            None => return Err(StoreError::NotFound(id.to_string())),
        };
        let version = head + 1;
        log.push(Node::tombstone(id, version, parent_id));
        debug!("event=node_delete module=store id={} version={}", id, version);
        Ok(version)
    }
}

/// Exclusive write access to one id. Other writers on the same id get
/// `Conflict` until this claim is dropped.
pub struct WriteClaim<'a> {
    store: &'a Store,
    id: String,
    lock: Option<Arc<InMemoryLock>>,
}

impl WriteClaim<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Latest committed version of the claimed id (0 if never written).
    pub fn version(&self) -> Result<u64, StoreError> {
        Ok(self.store.read_log()?.latest_version(&self.id))
    }

    pub fn put(&self, parent_id: Option<&str>, payload: Payload) -> Result<u64, StoreError> {
        self.store.append(&self.id, None, parent_id, payload)
    }

    pub fn put_if(
        &self,
        expected: u64,
        parent_id: Option<&str>,
        payload: Payload,
    ) -> Result<u64, StoreError> {
        self.store.append(&self.id, Some(expected), parent_id, payload)
    }

    pub fn delete(&self) -> Result<u64, StoreError> {
        self.store.append_tombstone(&self.id)
    }
}

impl Drop for WriteClaim<'_> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            let _ = lock.unlock();
            drop(lock);
            let _ = self.store.claims.prune(&self.id);
        }
    }
}
