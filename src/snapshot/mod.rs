//! Snapshot loader - builds a store from a YAML source tree and caches it
//! as a binary snapshot file next to the source.
//!
//! ## Source layout
//!
//! A directory where each `*.yaml` file is one item. `news--today.yaml` is
//! the item `/news/today`; a `Folder` is created for `/news` if no file
//! names it. The file body is a mapping of fields:
//!
//! ```yaml
//! kind: Page
//! description: A page about this demo.
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use mdb::snapshot;
//!
//! let source = Path::new("demo");
//! let path = snapshot::default_snapshot_path(source, None);
//! let store = snapshot::load(source, &path)?;
//! # Ok::<(), mdb::SnapshotError>(())
//! ```

mod error;
mod format;
mod loader;
mod source;

pub use error::SnapshotError;
pub use format::{SnapshotImage, FORMAT_VERSION, MAGIC};
pub use loader::{default_snapshot_path, load, rebuild, save, SNAPSHOT_EXTENSION};
pub use source::{Source, FOLDER_KIND, ROOT_ID};
