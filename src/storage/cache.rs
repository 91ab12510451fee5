use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Client-local key-value cache backed by one JSON object file.
///
/// Failures never reach the caller: a broken or missing file reads as empty
/// and failed writes are logged and dropped. Ledger state is never stored
/// here.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
}

impl LocalCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the value under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.load()?;
        let value = entries.remove(key)?;

        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key, error = %err, "ignoring undecodable cache entry");
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(err) = self.try_set(key, value) {
            warn!(key, error = %err, "cache write failed");
        }
    }

    pub fn remove(&self, key: &str) {
        let Some(mut entries) = self.load() else {
            return;
        };
        if entries.remove(key).is_some() {
            if let Err(err) = self.write(&entries) {
                warn!(key, error = %err, "cache write failed");
            }
        }
    }

    fn try_set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.load().unwrap_or_default();
        let encoded = serde_json::to_value(value).context("Failed to encode cache value")?;
        entries.insert(key.to_string(), encoded);
        self.write(&entries)
    }

    fn write(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        let contents = serde_json::to_vec_pretty(entries)?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn load(&self) -> Option<BTreeMap<String, Value>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache file yet");
                return None;
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => Some(entries),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cache file is not a JSON object");
                None
            }
        }
    }
}
