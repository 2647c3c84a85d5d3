use std::collections::HashMap;
use std::sync::Arc;

use crate::node::Node;

use super::error::StoreError;

/// Append-only version log plus the indexes derived from it.
///
/// `nodes[v - 1]` is the node written at version `v`. Every index can be
/// rebuilt from `nodes` alone, which is what snapshot restore relies on.
#[derive(Debug, Default)]
pub(crate) struct Log {
    nodes: Vec<Arc<Node>>,
    versions: HashMap<String, Vec<u64>>,
    created: Vec<String>,
    children: HashMap<String, Vec<String>>,
}

impl Log {
    pub(crate) fn head(&self) -> u64 {
        self.nodes.len() as u64
    }

    pub(crate) fn id_count(&self) -> usize {
        self.created.len()
    }

    pub(crate) fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub(crate) fn created(&self) -> &[String] {
        &self.created
    }

    /// Latest version number written for `id`, visible or not.
    pub(crate) fn latest_version(&self, id: &str) -> u64 {
        self.versions
            .get(id)
            .and_then(|versions| versions.last().copied())
            .unwrap_or(0)
    }

    /// The newest version of `id` at or before `at`, tombstones included.
    pub(crate) fn entry_at(&self, id: &str, at: u64) -> Option<&Arc<Node>> {
        let versions = self.versions.get(id)?;
        let idx = versions.partition_point(|v| *v <= at);
        if idx == 0 {
            return None;
        }
        self.nodes.get((versions[idx - 1] - 1) as usize)
    }

    /// Like `entry_at` but a tombstone reads as absent.
    pub(crate) fn visible_at(&self, id: &str, at: u64) -> Option<&Arc<Node>> {
        self.entry_at(id, at).filter(|node| !node.deleted)
    }

    pub(crate) fn history(&self, id: &str) -> Vec<Node> {
        self.versions
            .get(id)
            .map(|versions| {
                versions
                    .iter()
                    .filter_map(|v| self.nodes.get((*v - 1) as usize))
                    .map(|node| node.as_ref().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids that were ever attached under `parent`, in attach order.
    pub(crate) fn child_candidates(&self, parent: &str) -> &[String] {
        self.children
            .get(parent)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `ancestor` appears on the parent chain of `id` at head
    /// (`id` itself included).
    pub(crate) fn has_ancestor(&self, id: &str, ancestor: &str) -> bool {
        let head = self.head();
        let mut current = Some(id.to_string());
        let mut steps = 0usize;
        while let Some(cursor) = current {
            if cursor == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.created.len() {
                return true;
            }
            current = self
                .visible_at(&cursor, head)
                .and_then(|node| node.parent_id.clone());
        }
        false
    }

    /// Append the next version. The caller has already assigned
    /// `node.version == head() + 1`.
    pub(crate) fn push(&mut self, node: Node) {
        debug_assert_eq!(node.version, self.head() + 1);
        let versions = self.versions.entry(node.id.clone()).or_default();
        if versions.is_empty() {
            self.created.push(node.id.clone());
        }
        versions.push(node.version);

        if let Some(parent) = &node.parent_id {
            let siblings = self.children.entry(parent.clone()).or_default();
            if !siblings.iter().any(|id| id == &node.id) {
                siblings.push(node.id.clone());
            }
        }
        self.nodes.push(Arc::new(node));
    }

    /// Rebuild a log from an exported version sequence.
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Result<Log, StoreError> {
        let mut log = Log::default();
        for node in nodes {
            let expected = log.head() + 1;
            if node.version != expected {
                return Err(StoreError::InvalidLog(format!(
                    "node {} has version {}, expected {}",
                    node.id, node.version, expected
                )));
            }
            log.push(node);
        }
        Ok(log)
    }
}
