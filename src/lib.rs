pub mod config;
pub mod connection;
pub mod lock;
pub mod logging;
mod node;
pub mod query;
pub mod service;
pub mod snapshot;
mod store;

pub use config::Config;
pub use node::{make_slug, make_title, Node, Payload, Value, DEFAULT_KIND};
pub use query::{Query, QueryError};
pub use service::{QueryService, Reply};
pub use snapshot::SnapshotError;
pub use store::{Store, StoreError, Traversal, View, WriteClaim};
