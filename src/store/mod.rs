//! Content store - append-only versioned nodes forming a tree.
//!
//! ## Example
//!
//! ```
//! use mdb::{Payload, Store, Value};
//!
//! let store = Store::new();
//! let mut fields = Payload::new();
//! fields.insert("name".into(), Value::from("home"));
//! let v1 = store.put("home", None, fields.clone()).unwrap();
//! store.delete("home").unwrap();
//!
//! assert!(store.get("home", None).unwrap().is_none());
//! assert!(store.get("home", Some(v1)).unwrap().is_some());
//! ```

mod error;
mod journal;
mod store;
mod view;

pub use error::StoreError;
pub use store::{Store, WriteClaim};
pub use view::{Traversal, View};
