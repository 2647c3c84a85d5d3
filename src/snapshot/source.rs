use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::node::{make_slug, make_title, yaml_key, Payload, Value, DEFAULT_KIND};
use crate::store::Store;

use super::error::SnapshotError;

/// Id of the node every source tree hangs from.
pub const ROOT_ID: &str = "root";

/// Kind given to the root and to folders created for missing path segments.
pub const FOLDER_KIND: &str = "Folder";

const SOURCE_EXTENSION: &str = "yaml";

/// Separator between path segments in a source file name.
const SEGMENT_SEPARATOR: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// One `*.yaml` file per item; the file name encodes the path.
    Directory,
    /// One YAML file mapping item paths to fields.
    File,
}

#[derive(Debug, Clone)]
struct SourceFile {
    name: String,
    path: PathBuf,
    contents: String,
}

/// A source tree read into memory.
#[derive(Debug, Clone)]
pub struct Source {
    path: PathBuf,
    layout: Layout,
    root_name: String,
    files: Vec<SourceFile>,
}

struct Item {
    origin: PathBuf,
    segments: Vec<String>,
    fields: Payload,
}

impl Source {
    /// Read every source file under `path` (a directory of item files or a
    /// single YAML file).
    pub fn open(path: &Path) -> Result<Source, SnapshotError> {
        let metadata = fs::metadata(path).map_err(|e| SnapshotError::io(path, e))?;
        if metadata.is_dir() {
            Self::open_dir(path)
        } else {
            Self::open_file(path)
        }
    }

    fn open_dir(path: &Path) -> Result<Source, SnapshotError> {
        let entries = fs::read_dir(path).map_err(|e| SnapshotError::io(path, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SnapshotError::io(path, e))?;
            let file_path = entry.path();
            let is_source = file_path.is_file()
                && file_path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION);
            if !is_source {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let contents = read_source(&file_path)?;
            files.push(SourceFile {
                name,
                path: file_path,
                contents,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Source {
            path: path.to_path_buf(),
            layout: Layout::Directory,
            root_name: base_name(path),
            files,
        })
    }

    fn open_file(path: &Path) -> Result<Source, SnapshotError> {
        let contents = read_source(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root_name = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ROOT_ID.to_string());

        Ok(Source {
            path: path.to_path_buf(),
            layout: Layout::File,
            root_name,
            files: vec![SourceFile {
                name,
                path: path.to_path_buf(),
                contents,
            }],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name given to the root node before slugging.
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Hex SHA-256 over the root name and the sorted file names and contents.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.root_name.as_bytes());
        hasher.update([0u8]);
        for file in &self.files {
            hasher.update(file.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(file.contents.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Latest modification time among the source files.
    pub fn modified(&self) -> Result<Option<SystemTime>, SnapshotError> {
        let mut newest = None;
        for file in &self.files {
            let modified = fs::metadata(&file.path)
                .and_then(|m| m.modified())
                .map_err(|e| SnapshotError::io(&file.path, e))?;
            if newest.map_or(true, |n| modified > n) {
                newest = Some(modified);
            }
        }
        Ok(newest)
    }

    /// Parse the source into a fresh store.
    pub fn build(&self) -> Result<Store, SnapshotError> {
        let items = match self.layout {
            Layout::Directory => self.directory_items()?,
            Layout::File => self.file_items()?,
        };

        let store = Store::new();
        let mut root_name = make_slug(&self.root_name);
        if root_name.is_empty() {
            root_name = ROOT_ID.to_string();
        }
        store.put(ROOT_ID, None, folder_fields(&root_name))?;

        let mut explicit = HashSet::new();
        for item in items {
            place(&store, &mut explicit, item)?;
        }
        Ok(store)
    }

    fn directory_items(&self) -> Result<Vec<Item>, SnapshotError> {
        let mut items = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let stem = file
                .name
                .strip_suffix(SOURCE_EXTENSION)
                .and_then(|s| s.strip_suffix('.'))
                .unwrap_or(&file.name);
            let parsed: serde_yaml::Value = serde_yaml::from_str(&file.contents)
                .map_err(|e| SnapshotError::source_format(&file.path, e.to_string()))?;
            items.push(Item {
                origin: file.path.clone(),
                segments: stem.split(SEGMENT_SEPARATOR).map(str::to_string).collect(),
                fields: fields_of(&file.path, parsed)?,
            });
        }
        Ok(items)
    }

    fn file_items(&self) -> Result<Vec<Item>, SnapshotError> {
        let mut items = Vec::new();
        for file in &self.files {
            let parsed: serde_yaml::Value = serde_yaml::from_str(&file.contents)
                .map_err(|e| SnapshotError::source_format(&file.path, e.to_string()))?;
            let mapping = match parsed {
                serde_yaml::Value::Mapping(mapping) => mapping,
                serde_yaml::Value::Null => continue,
                _ => {
                    return Err(SnapshotError::source_format(
                        &file.path,
                        "expected a mapping of item paths to fields",
                    ))
                }
            };
            for (key, value) in mapping {
                let key = yaml_key(key);
                let segments: Vec<String> = key
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if segments.is_empty() {
                    return Err(SnapshotError::source_format(
                        &file.path,
                        format!("empty item path {:?}", key),
                    ));
                }
                items.push(Item {
                    origin: file.path.clone(),
                    segments,
                    fields: fields_of(&file.path, value)?,
                });
            }
        }
        Ok(items)
    }
}

/// Write one item, creating folders for missing intermediate segments.
fn place(store: &Store, explicit: &mut HashSet<String>, item: Item) -> Result<(), SnapshotError> {
    let Item {
        origin,
        segments,
        mut fields,
    } = item;
    let Some((leaf, folders)) = segments.split_last() else {
        return Err(SnapshotError::source_format(&origin, "empty item path"));
    };

    let mut parent = ROOT_ID.to_string();
    let mut prefix = String::new();
    for segment in folders {
        let name = make_slug(segment);
        if name.is_empty() {
            return Err(SnapshotError::source_format(
                &origin,
                format!("path segment {:?} has no usable characters", segment),
            ));
        }
        prefix = format!("{}/{}", prefix, name);
        if store.get(&prefix, None)?.is_none() {
            store.put(&prefix, Some(parent.as_str()), folder_fields(&name))?;
        }
        parent = prefix.clone();
    }

    let given = fields
        .get("name")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);
    let name = make_slug(given.as_deref().unwrap_or(leaf.as_str()));
    if name.is_empty() {
        return Err(SnapshotError::source_format(&origin, "item has no usable name"));
    }
    let has_title = fields
        .get("title")
        .map(|t| t.as_str().map_or(!t.is_null(), |s| !s.trim().is_empty()))
        .unwrap_or(false);
    if !has_title {
        fields.insert("title".into(), Value::from(make_title(&name)));
    }
    fields.insert("name".into(), Value::from(name.as_str()));

    let id = format!("{}/{}", prefix, name);
    if !explicit.insert(id.clone()) {
        return Err(SnapshotError::source_format(
            &origin,
            format!("duplicate item {}", id),
        ));
    }

    match store.get(&id, None)? {
        // A folder created for an earlier item's path: overlay the fields.
        Some(existing) => {
            let mut merged = existing.payload;
            merged.extend(fields);
            store.put(&id, Some(parent.as_str()), merged)?;
        }
        None => {
            fields
                .entry("kind".to_string())
                .or_insert_with(|| Value::from(DEFAULT_KIND));
            store.put(&id, Some(parent.as_str()), fields)?;
        }
    }
    Ok(())
}

fn folder_fields(name: &str) -> Payload {
    let mut fields = Payload::new();
    fields.insert("kind".into(), Value::from(FOLDER_KIND));
    fields.insert("name".into(), Value::from(name));
    fields.insert("title".into(), Value::from(make_title(name)));
    fields
}

fn fields_of(origin: &Path, value: serde_yaml::Value) -> Result<Payload, SnapshotError> {
    match value {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping
            .into_iter()
            .map(|(k, v)| (yaml_key(k), Value::from_yaml(v)))
            .collect()),
        serde_yaml::Value::Null => Ok(Payload::new()),
        _ => Err(SnapshotError::source_format(
            origin,
            "expected a mapping of field names to values",
        )),
    }
}

/// Read one source file. Bytes that are not UTF-8 make it unparsable.
fn read_source(path: &Path) -> Result<String, SnapshotError> {
    let bytes = fs::read(path).map_err(|e| SnapshotError::io(path, e))?;
    String::from_utf8(bytes)
        .map_err(|e| SnapshotError::source_format(path, format!("not valid UTF-8: {}", e)))
}

/// Final path component, resolving `.` and similar through the filesystem.
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            fs::canonicalize(path)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| ROOT_ID.to_string())
}
