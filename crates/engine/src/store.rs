//! Integer key/value persistence.
//!
//! Only the high score is stored today. [`JsonFileStore`] keeps every value
//! in memory and writes the whole map on [`KvStore::save`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::core::{HighScoreStore, SaveError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait KvStore: Send {
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn set_int(&mut self, key: &str, value: i64);
    fn save(&mut self) -> Result<(), StoreError>;
}

/// Lets the score engine persist through any [`KvStore`]
pub(crate) struct HighScores<'a>(pub &'a mut dyn KvStore);

impl HighScoreStore for HighScores<'_> {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.0.get_int(key, default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.0.set_int(key, value);
    }

    fn save(&mut self) -> Result<(), SaveError> {
        self.0.save().map_err(SaveError::new)
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, i64>,
    saves: usize,
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvStore for MemoryStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.lock().values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.lock().values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.lock().saves += 1;
        Ok(())
    }
}

/// Store backed by a pretty-printed JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, i64>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvStore for JsonFileStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
