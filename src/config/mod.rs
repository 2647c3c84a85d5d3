//! Runtime configuration.
//!
//! Values come from defaults, then an optional YAML file, then `MDB_*`
//! environment variables. The binary layers its command-line flags last.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::snapshot::default_snapshot_path;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:5280";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source tree: a directory of item files or a single YAML file.
    pub source: PathBuf,
    /// Names the snapshot file. Defaults to the source base name.
    pub app_id: Option<String>,
    /// Explicit snapshot path; overrides `app_id`.
    pub snapshot: Option<PathBuf>,
    pub log_level: String,
    /// Rotating log files go here; stderr when unset.
    pub log_dir: Option<PathBuf>,
    /// Address the HTTP endpoint binds to.
    pub listen: String,
    /// Overrides that were rejected while loading. Logging usually starts
    /// after the config is read, so callers log these once it is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            app_id: None,
            snapshot: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            listen: DEFAULT_LISTEN.to_string(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "failed to read {}: {}", path.display(), message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "failed to parse {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Defaults, then `file` when given, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Config, ConfigError> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        Ok(config.with_env_overrides())
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply `MDB_SOURCE`, `MDB_APP_ID`, `MDB_SNAPSHOT`, `MDB_LOG_LEVEL`,
    /// `MDB_LOG_DIR` and `MDB_LISTEN`. Blank values are ignored.
    pub fn with_env_overrides(self) -> Config {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup` instead of the process
    /// environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(source) = value("MDB_SOURCE") {
            self.source = PathBuf::from(source);
        }
        if let Some(app_id) = value("MDB_APP_ID") {
            self.app_id = Some(app_id);
        }
        if let Some(snapshot) = value("MDB_SNAPSHOT") {
            self.snapshot = Some(PathBuf::from(snapshot));
        }
        if let Some(level) = value("MDB_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(dir) = value("MDB_LOG_DIR") {
            if Path::new(&dir).is_absolute() {
                self.log_dir = Some(PathBuf::from(dir));
            } else {
                self.warnings.push(format!(
                    "event=config module=config status=ignored var=MDB_LOG_DIR reason=relative_path value={}",
                    dir
                ));
            }
        }
        if let Some(listen) = value("MDB_LISTEN") {
            self.listen = listen;
        }
        self
    }

    /// Where the snapshot for `source` lives.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot
            .clone()
            .unwrap_or_else(|| default_snapshot_path(&self.source, self.app_id.as_deref()))
    }
}
