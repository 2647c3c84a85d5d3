use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use log::error;

use crate::node::Node;

use super::error::StoreError;
use super::journal::Log;

/// A read transaction pinned to one committed version.
///
/// Every read through a `View` answers as of `version()`, so writes that
/// commit while a request is running are invisible to it. A view holds no
/// lock between calls.
#[derive(Clone, Debug)]
pub struct View {
    log: Arc<RwLock<Log>>,
    at: u64,
}

impl View {
    pub(crate) fn new(log: Arc<RwLock<Log>>, at: u64) -> Self {
        View { log, at }
    }

    pub fn version(&self) -> u64 {
        self.at
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Log>, StoreError> {
        self.log
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))
    }

    /// The node visible for `id`, or `None` when it never existed at this
    /// version or its latest version is a tombstone.
    pub fn get(&self, id: &str) -> Result<Option<Node>, StoreError> {
        let log = self.read()?;
        Ok(log.visible_at(id, self.at).map(|node| node.as_ref().clone()))
    }

    /// Visible children of `id` in the order they were attached to it.
    pub fn children(&self, id: &str) -> Result<Vec<Node>, StoreError> {
        let log = self.read()?;
        Ok(children_of(&log, id, self.at)
            .map(|node| node.as_ref().clone())
            .collect())
    }

    pub fn parent(&self, id: &str) -> Result<Option<Node>, StoreError> {
        let log = self.read()?;
        Ok(log
            .visible_at(id, self.at)
            .and_then(|node| node.parent_id.as_deref())
            .and_then(|parent| log.visible_at(parent, self.at))
            .map(|node| node.as_ref().clone()))
    }

    /// Traversal starting points: nodes without a parent, then nodes whose
    /// parent is absent at this version. Both in creation order.
    pub fn roots(&self) -> Result<Vec<Node>, StoreError> {
        let log = self.read()?;
        Ok(root_ids(&log, self.at)
            .into_iter()
            .filter_map(|id| log.visible_at(&id, self.at).map(|n| n.as_ref().clone()))
            .collect())
    }

    /// Lazy depth-first traversal over every visible node.
    pub fn all(&self) -> Result<Traversal, StoreError> {
        let roots = {
            let log = self.read()?;
            root_ids(&log, self.at)
        };
        Ok(Traversal::new(self.clone(), roots))
    }

    /// Slash path built from ancestor names. True roots are `/`; an orphan
    /// contributes its own name as the first segment.
    pub fn path(&self, id: &str) -> Result<Option<String>, StoreError> {
        let log = self.read()?;
        let Some(mut node) = log.visible_at(id, self.at) else {
            return Ok(None);
        };
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(node.id.as_str()) {
                break;
            }
            let Some(parent_id) = node.parent_id.as_deref() else {
                break;
            };
            segments.push(node.name());
            match log.visible_at(parent_id, self.at) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        segments.reverse();
        Ok(Some(format!("/{}", segments.join("/"))))
    }
}

fn children_of<'a>(log: &'a Log, id: &'a str, at: u64) -> impl Iterator<Item = &'a Arc<Node>> {
    log.child_candidates(id)
        .iter()
        .filter_map(move |child| log.visible_at(child, at))
        .filter(move |node| node.parent_id.as_deref() == Some(id))
}

fn root_ids(log: &Log, at: u64) -> Vec<String> {
    let mut roots = Vec::new();
    let mut orphans = Vec::new();
    for id in log.created() {
        let Some(node) = log.visible_at(id, at) else {
            continue;
        };
        match node.parent_id.as_deref() {
            None => roots.push(id.clone()),
            Some(parent) if log.visible_at(parent, at).is_none() => orphans.push(id.clone()),
            Some(_) => {}
        }
    }
    roots.extend(orphans);
    roots
}

/// Depth-first, pre-order walk over a `View`.
///
/// Nodes are fetched one at a time, so the walk is lazy; `restart` rewinds
/// it to the first root. The traversal ends early if the store lock is
/// poisoned.
#[derive(Clone, Debug)]
pub struct Traversal {
    view: View,
    roots: Vec<String>,
    stack: Vec<String>,
    seen: HashSet<String>,
}

impl Traversal {
    fn new(view: View, roots: Vec<String>) -> Self {
        let stack = roots.iter().rev().cloned().collect();
        Traversal {
            view,
            roots,
            stack,
            seen: HashSet::new(),
        }
    }

    pub fn restart(&mut self) {
        self.stack = self.roots.iter().rev().cloned().collect();
        self.seen.clear();
    }

    pub fn version(&self) -> u64 {
        self.view.version()
    }
}

impl Iterator for Traversal {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let log = match self.view.read() {
            Ok(log) => log,
            Err(err) => {
                error!("event=traversal_abort module=store error={}", err);
                return None;
            }
        };
        while let Some(id) = self.stack.pop() {
            if !self.seen.insert(id.clone()) {
                continue;
            }
            let Some(node) = log.visible_at(&id, self.view.at) else {
                continue;
            };
            let children: Vec<String> = children_of(&log, &id, self.view.at)
                .map(|child| child.id.clone())
                .collect();
            self.stack.extend(children.into_iter().rev());
            return Some(node.as_ref().clone());
        }
        None
    }
}
