//! Node - one immutable version of a unit of structured content.

mod node;
mod value;

pub use node::{make_slug, make_title, Node, DEFAULT_KIND};
pub use value::{Payload, Value};
pub(crate) use value::yaml_key;
