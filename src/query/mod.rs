//! Query engine - path expressions evaluated against a pinned store view.
//!
//! Grammar:
//!
//! ```text
//! query     := "*" | "#" ID | path
//! path      := "/" | ("/" | "//")? step (("/" | "//") step)*
//! step      := ("*" | "." | ".." | NAME) ("[" INTEGER "]")*
//! ```
//!
//! A `NAME` starting with an uppercase letter tests the node kind, any other
//! name tests the node name.
//!
//! Each step expands every context node in turn and the results are
//! concatenated, first occurrence wins. `//Page` therefore lists the matching
//! children of the first node in depth-first order, then those of the next,
//! and so on; it is not a plain depth-first listing of every `Page`.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;

pub use ast::{Axis, NodeTest, PathExpr, Query, Step};
pub use error::QueryError;
pub use parser::parse;

use crate::node::Node;
use crate::store::Store;

impl Query {
    pub fn parse(source: &str) -> Result<Query, QueryError> {
        parse(source)
    }
}

/// Parse `source` and evaluate it at `version` (head when `None`).
pub fn evaluate(source: &str, store: &Store, version: Option<u64>) -> Result<Vec<Node>, QueryError> {
    let query = parse(source)?;
    let view = store.view(version)?;
    query.evaluate(&view)
}
