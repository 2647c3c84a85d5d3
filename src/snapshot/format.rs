use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::node::Node;

use super::error::SnapshotError;

/// Leading bytes of every snapshot file.
pub const MAGIC: &[u8; 7] = b"MDBSNAP";

/// Bumped whenever the encoded image layout changes.
pub const FORMAT_VERSION: u8 = 1;

/// Everything persisted in a snapshot file: the full version log plus the
/// digest of the source it was built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotImage {
    pub source_digest: String,
    pub nodes: Vec<Node>,
}

impl SnapshotImage {
    pub fn encode(&self) -> Result<Vec<u8>, bitcode::Error> {
        let body = bitcode::serialize(self)?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + body.len());
        bytes.extend_from_slice(MAGIC);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Decode a snapshot file body. The error is a human-readable reason.
    pub fn decode(bytes: &[u8]) -> Result<SnapshotImage, String> {
        let Some(rest) = bytes.strip_prefix(MAGIC.as_slice()) else {
            return Err("missing snapshot header".to_string());
        };
        match rest.split_first() {
            Some((&FORMAT_VERSION, body)) => {
                bitcode::deserialize(body).map_err(|e| format!("snapshot deserialize: {e}"))
            }
            Some((other, _)) => Err(format!("unsupported snapshot format {}", other)),
            None => Err("truncated snapshot header".to_string()),
        }
    }
}

/// Read the image at `path`. `Ok(None)` when no snapshot exists.
pub(crate) fn read_image(path: &Path) -> Result<Option<SnapshotImage>, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SnapshotError::io(path, e)),
    };
    SnapshotImage::decode(&bytes)
        .map(Some)
        .map_err(|message| SnapshotError::corrupt(path, message))
}

/// Write the image next to `path` and rename it into place so readers never
/// observe a partial file.
pub(crate) fn write_image(path: &Path, image: &SnapshotImage) -> Result<(), SnapshotError> {
    let bytes = image
        .encode()
        .map_err(|e| SnapshotError::corrupt(path, format!("snapshot serialize: {e}")))?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| SnapshotError::io(dir, e))?;
    }

    let tmp = temp_path(path);
    let result = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::io(path, e));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
