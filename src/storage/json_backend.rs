use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    errors::{BudgetError, Result},
    utils::{write_atomic, PathResolver},
};

use super::KeyValueStore;

/// Key-value store persisted as one JSON object of string values.
///
/// Every mutation rewrites the whole file through a temp file, so a crash leaves
/// either the old or the new contents on disk.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonStorage {
    /// Opens the session file under `root`, or under the default data directory.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = PathResolver::resolve_base(root);
        Self::open(PathResolver::session_file_in(&base))
    }

    /// Opens (or lazily creates) the store backed by `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let data = fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data).map_err(|err| {
                    BudgetError::StorageError(format!(
                        "session file `{}` is corrupt: {err}",
                        path.display()
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "session store opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        write_atomic(&self.path, &json)
    }
}

impl KeyValueStore for JsonStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.flush() {
            self.entries.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }

    fn apply(&mut self, changes: &[(&str, Option<&str>)]) -> Result<()> {
        let before = self.entries.clone();
        for &(key, value) in changes {
            match value {
                Some(value) => self.entries.insert(key.to_string(), value.to_string()),
                None => self.entries.remove(key),
            };
        }
        if let Err(err) = self.flush() {
            self.entries = before;
            return Err(err);
        }
        Ok(())
    }
}
