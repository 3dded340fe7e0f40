//! Key-value persistence for JSON blobs.
//!
//! The history store only needs `get` and `set` by string key. Two backends
//! are provided: an in-memory map and a single JSON object file guarded by
//! file locks and replaced atomically on every write.

use crate::{Error, Result};
use fs2::FileExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Flat key-value storage of JSON values
pub trait KvStore {
    /// Fetch the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// In-memory store, used for tests and dry runs
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// File-backed store holding every key in one JSON object
///
/// Readers hold a shared lock and writers an exclusive lock on a sidecar
/// `<file>.lock`, so a read-modify-write in `set` never interleaves with
/// another process.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the given path; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Open the sidecar lock file, creating it and its directory if needed
    fn open_lock(&self) -> Result<File> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        Ok(file)
    }

    /// Read the whole map; callers hold the lock
    fn read_map(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let mut contents = String::new();
        std::io::BufReader::new(File::open(&self.path)?).read_to_string(&mut contents)?;

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::MalformedData {
                key: self.path.display().to_string(),
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => Err(Error::MalformedData {
                key: self.path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Atomically replace the file with `map`; callers hold the lock
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames it
    /// over the original so readers never observe a partial write.
    fn write_map(&self, map: &Map<String, Value>) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, map)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = self.read_map();
        lock.unlock()?;

        let mut map = result?;
        Ok(map.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        // A corrupt file is never overwritten: read_map fails first.
        let result = self.read_map().and_then(|mut map| {
            map.insert(key.to_string(), value);
            self.write_map(&map)
        });
        lock.unlock()?;
        result?;

        tracing::debug!("Stored key {} in {:?}", key, self.path);
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
