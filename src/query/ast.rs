use std::fmt;

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `*`: every visible node, depth first.
    All,
    /// `#id`: exact id lookup.
    Id(String),
    Path(PathExpr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    /// Written with a leading `/` or `//`. Both forms start from the roots.
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    /// 1-based positions, applied in order.
    pub predicates: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    SelfNode,
    Parent,
    DescendantOrSelf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    Any,
    /// Matches the node name.
    Name(String),
    /// Matches the node kind. Written as a name starting with an uppercase letter.
    Kind(String),
}

impl Step {
    pub(crate) fn descendant_or_self() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Any,
            predicates: Vec::new(),
        }
    }

    fn is_descendant_or_self(&self) -> bool {
        self.axis == Axis::DescendantOrSelf
            && self.test == NodeTest::Any
            && self.predicates.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::All => write!(f, "*"),
            Query::Id(id) => write!(f, "#{}", id),
            Query::Path(path) => write!(f, "{}", path),
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending_separator = self.absolute;
        let mut wrote_any = false;
        for step in &self.steps {
            if step.is_descendant_or_self() {
                write!(f, "//")?;
                pending_separator = false;
                wrote_any = true;
                continue;
            }
            if pending_separator {
                write!(f, "/")?;
            }
            write!(f, "{}", step)?;
            pending_separator = true;
            wrote_any = true;
        }
        if !wrote_any && self.absolute {
            write!(f, "/")?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.axis, &self.test) {
            (Axis::SelfNode, _) => write!(f, ".")?,
            (Axis::Parent, _) => write!(f, "..")?,
            (_, NodeTest::Any) => write!(f, "*")?,
            (_, NodeTest::Name(name)) | (_, NodeTest::Kind(name)) => write!(f, "{}", name)?,
        }
        for position in &self.predicates {
            write!(f, "[{}]", position)?;
        }
        Ok(())
    }
}
