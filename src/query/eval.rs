use std::collections::HashSet;

use crate::node::Node;
use crate::store::View;

use super::ast::{Axis, NodeTest, PathExpr, Query, Step};
use super::error::QueryError;

impl Query {
    /// Evaluate against a pinned view. No match is an empty result, never an
    /// error.
    pub fn evaluate(&self, view: &View) -> Result<Vec<Node>, QueryError> {
        match self {
            Query::All => Ok(view.all()?.collect()),
            Query::Id(id) => Ok(view.get(id)?.into_iter().collect()),
            Query::Path(path) => path.evaluate(view),
        }
    }
}

impl PathExpr {
    pub fn evaluate(&self, view: &View) -> Result<Vec<Node>, QueryError> {
        let mut context = view.roots()?;
        for step in &self.steps {
            let mut next = Vec::new();
            for node in &context {
                let mut selected = step.expand(view, node)?;
                for position in &step.predicates {
                    selected = match position.checked_sub(1) {
                        Some(index) => selected.into_iter().nth(index).into_iter().collect(),
                        None => Vec::new(),
                    };
                }
                next.extend(selected);
            }
            context = unique(next);
        }
        Ok(context)
    }
}

impl Step {
    fn expand(&self, view: &View, node: &Node) -> Result<Vec<Node>, QueryError> {
        let candidates = match self.axis {
            Axis::Child => view.children(&node.id)?,
            Axis::SelfNode => vec![node.clone()],
            Axis::Parent => view.parent(&node.id)?.into_iter().collect(),
            Axis::DescendantOrSelf => descendants_or_self(view, node)?,
        };
        Ok(candidates
            .into_iter()
            .filter(|candidate| self.test.matches(candidate))
            .collect())
    }
}

impl NodeTest {
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            NodeTest::Any => true,
            NodeTest::Name(name) => node.name() == name,
            NodeTest::Kind(kind) => node.kind() == kind,
        }
    }
}

fn descendants_or_self(view: &View, node: &Node) -> Result<Vec<Node>, QueryError> {
    let mut out = Vec::new();
    let mut stack = vec![node.clone()];
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if !seen.insert(current.id.clone()) {
            continue;
        }
        let children = view.children(&current.id)?;
        out.push(current);
        stack.extend(children.into_iter().rev());
    }
    Ok(out)
}

/// Drop repeated ids, keeping the first occurrence.
fn unique(nodes: Vec<Node>) -> Vec<Node> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.id.clone()))
        .collect()
}
