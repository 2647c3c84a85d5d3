use std::fmt;
use std::path::{Path, PathBuf};

use crate::store::StoreError;

/// Errors raised while building a store from source or restoring a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// The source tree could not be parsed. Fatal at startup.
    SourceFormat { path: PathBuf, message: String },
    /// An existing snapshot could not be decoded. `load` recovers from this
    /// by rebuilding from source.
    SnapshotCorrupt { path: PathBuf, message: String },
    Io { path: PathBuf, message: String },
    /// The parsed source could not be written into a store.
    Store(StoreError),
}

impl SnapshotError {
    pub(crate) fn source_format(path: &Path, message: impl Into<String>) -> Self {
        SnapshotError::SourceFormat {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn corrupt(path: &Path, message: impl Into<String>) -> Self {
        SnapshotError::SnapshotCorrupt {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        SnapshotError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn is_source_format(&self) -> bool {
        matches!(self, SnapshotError::SourceFormat { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, SnapshotError::SnapshotCorrupt { .. })
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::SourceFormat { path, message } => {
                write!(f, "invalid source {}: {}", path.display(), message)
            }
            SnapshotError::SnapshotCorrupt { path, message } => {
                write!(f, "corrupt snapshot {}: {}", path.display(), message)
            }
            SnapshotError::Io { path, message } => {
                write!(f, "i/o error on {}: {}", path.display(), message)
            }
            SnapshotError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SnapshotError {
    fn from(err: StoreError) -> Self {
        SnapshotError::Store(err)
    }
}
