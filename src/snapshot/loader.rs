use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::store::Store;

use super::error::SnapshotError;
use super::format::{read_image, write_image, SnapshotImage};
use super::source::{base_name, Source};

/// File extension of snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "data";

/// `<source_dir>/<app_id>.data`. `app_id` defaults to the base name of the
/// source directory (or the stem of a single source file).
pub fn default_snapshot_path(source: &Path, app_id: Option<&str>) -> PathBuf {
    let (dir, default_id) = if source.is_dir() {
        (source.to_path_buf(), base_name(source))
    } else {
        let dir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| base_name(source));
        (dir, stem)
    };
    let app_id = app_id.map(str::to_string).unwrap_or(default_id);
    dir.join(format!("{}.{}", app_id, SNAPSHOT_EXTENSION))
}

/// Load a store, reusing the snapshot at `snapshot` when it is still fresh
/// for `source` and rebuilding (and rewriting the snapshot) otherwise.
///
/// A snapshot that cannot be decoded is logged and replaced; only source
/// errors fail the load.
pub fn load(source: &Path, snapshot: &Path) -> Result<Store, SnapshotError> {
    let started_at = Instant::now();
    let tree = Source::open(source)?;
    let digest = tree.digest();

    match restore(&tree, &digest, snapshot) {
        Ok(Some(store)) => {
            info!(
                "event=snapshot_load module=snapshot status=ok mode=restore path={} head={} duration_ms={}",
                snapshot.display(),
                store.head()?,
                started_at.elapsed().as_millis()
            );
            return Ok(store);
        }
        Ok(None) => {}
        Err(err) => {
            warn!(
                "event=snapshot_load module=snapshot status=fallback path={} error={}",
                snapshot.display(),
                err
            );
        }
    }

    let store = build_and_persist(&tree, digest, snapshot)?;
    info!(
        "event=snapshot_load module=snapshot status=ok mode=rebuild path={} head={} duration_ms={}",
        snapshot.display(),
        store.head()?,
        started_at.elapsed().as_millis()
    );
    Ok(store)
}

/// Discard any snapshot at `snapshot` and rebuild from `source`.
pub fn rebuild(source: &Path, snapshot: &Path) -> Result<Store, SnapshotError> {
    let tree = Source::open(source)?;
    match fs::remove_file(snapshot) {
        Ok(()) => debug!(
            "event=snapshot_discard module=snapshot path={}",
            snapshot.display()
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(SnapshotError::io(snapshot, e)),
    }
    let digest = tree.digest();
    build_and_persist(&tree, digest, snapshot)
}

/// Write `store` to `snapshot`, recording the digest of `source`.
pub fn save(store: &Store, source: &Path, snapshot: &Path) -> Result<(), SnapshotError> {
    let tree = Source::open(source)?;
    let image = SnapshotImage {
        source_digest: tree.digest(),
        nodes: store.export()?,
    };
    write_image(snapshot, &image)
}

/// The store held in `snapshot`, or `None` when it is missing or stale.
fn restore(tree: &Source, digest: &str, snapshot: &Path) -> Result<Option<Store>, SnapshotError> {
    let written = match fs::metadata(snapshot).and_then(|m| m.modified()) {
        Ok(written) => written,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SnapshotError::io(snapshot, e)),
    };
    if tree.modified()?.is_some_and(|newest| newest > written) {
        debug!(
            "event=snapshot_stale module=snapshot reason=source_newer path={}",
            snapshot.display()
        );
        return Ok(None);
    }

    let Some(image) = read_image(snapshot)? else {
        return Ok(None);
    };
    if image.source_digest != digest {
        debug!(
            "event=snapshot_stale module=snapshot reason=digest path={}",
            snapshot.display()
        );
        return Ok(None);
    }

    Store::from_nodes(image.nodes)
        .map(Some)
        .map_err(|e| SnapshotError::corrupt(snapshot, e.to_string()))
}

fn build_and_persist(tree: &Source, digest: String, snapshot: &Path) -> Result<Store, SnapshotError> {
    let store = tree.build()?;
    let image = SnapshotImage {
        source_digest: digest,
        nodes: store.export()?,
    };
    if let Err(err) = write_image(snapshot, &image) {
        error!(
            "event=snapshot_write module=snapshot status=error path={} error={}",
            snapshot.display(),
            err
        );
    }
    Ok(store)
}
