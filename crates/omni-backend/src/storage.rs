//! Durable JSON key-value store backing the local backend.
//!
//! Each fixed key maps to one JSON file under a data directory. Reads
//! tolerate corruption: an unparsable file is cleared and the collection
//! restarts empty instead of poisoning every subsequent operation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use omni_core::{Error, Result};

/// File-per-key JSON collection store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Whether any data exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// Read the collection stored under `key`.
    ///
    /// A missing key yields an empty collection. A corrupt blob is cleared
    /// and also yields an empty collection, with a warning.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&path)?;
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                let corrupt = Error::StorageCorrupt(format!("{key}: {e}"));
                warn!(key = %key, error = %corrupt, "corrupt collection in storage, resetting");
                remove_quietly(&path);
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the collection stored under `key`.
    pub fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        fs::write(self.path_for(key), json)
            .map_err(|e| Error::Transport(format!("failed to write {key}: {e}")))
    }

    /// Remove the collection stored under `key`, if any.
    pub fn clear(&self, key: &str) {
        remove_quietly(&self.path_for(key));
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove storage file");
        }
    }
}
