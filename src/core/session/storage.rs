// src/core/session/storage.rs

//! The persistence medium behind the session store and the merge-write discipline over it.
//!
//! The persisted blob is a JSON object. Every write reads the current object, overlays only
//! the fields being changed and writes the whole object back, so one operation never erases
//! fields written by another (or keys this crate does not know about).

use crate::core::NavGateError;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const KEY_CURRENT: &str = "current";
pub const KEY_TOKEN: &str = "token";
pub const KEY_USERS: &str = "users";

/// A key-value blob store holding one serialized session record.
pub trait SessionStorage {
    /// Returns the stored blob, or `None` if nothing has been persisted yet.
    fn load(&self) -> Result<Option<String>, NavGateError>;

    /// Replaces the stored blob.
    fn save(&self, contents: &str) -> Result<(), NavGateError>;
}

/// Stores the blob in a file, replacing it atomically on every save.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, NavGateError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<(), NavGateError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let temp_path_str = format!("{}.tmp.{}", self.path.display(), rand::random::<u32>());
        let temp_path = Path::new(&temp_path_str);

        // Step 1: Write the full record to a temporary sibling.
        if let Err(e) = fs::write(temp_path, contents) {
            error!("Failed to write temporary session file '{}': {e}", temp_path_str);
            let _ = fs::remove_file(temp_path);
            return Err(e.into());
        }

        // Step 2: Atomically rename it over the real file.
        if let Err(e) = fs::rename(temp_path, &self.path) {
            error!(
                "Failed to rename temporary session file '{}' to '{}': {e}",
                temp_path_str,
                self.path.display()
            );
            if let Err(remove_err) = fs::remove_file(temp_path) {
                error!(
                    "Additionally failed to remove temporary session file '{}': {remove_err}",
                    temp_path_str
                );
            }
            return Err(e.into());
        }

        debug!("Session record written to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the blob in memory. Clones share the same blob, so a test can keep one handle
/// to inspect what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing blob, as if a previous process had written it.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.blob.lock().clone()
    }

    pub fn set_contents(&self, contents: Option<String>) {
        *self.blob.lock() = contents;
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, NavGateError> {
        Ok(self.blob.lock().clone())
    }

    fn save(&self, contents: &str) -> Result<(), NavGateError> {
        *self.blob.lock() = Some(contents.to_string());
        Ok(())
    }
}

/// Reads and parses the persisted record. `Ok(None)` if nothing is stored;
/// an error if the blob exists but is not a JSON object.
pub fn read_record<S: SessionStorage + ?Sized>(
    storage: &S,
) -> Result<Option<Map<String, Value>>, NavGateError> {
    let Some(raw) = storage.load()? else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(NavGateError::Storage(format!(
            "persisted session record is not an object (found {})",
            json_kind(&other)
        ))),
    }
}

/// One field change in a merge-write: `Some` sets the key, `None` removes it.
pub type FieldUpdate = (&'static str, Option<Value>);

/// Read-merge-write: overlays `updates` onto whatever is persisted and writes the result back.
pub fn merge_write<S: SessionStorage + ?Sized>(
    storage: &S,
    updates: Vec<FieldUpdate>,
) -> Result<(), NavGateError> {
    merge_update(storage, |record| {
        for (key, value) in updates {
            match value {
                Some(value) => {
                    record.insert(key.to_string(), value);
                }
                None => {
                    record.remove(key);
                }
            }
        }
        Ok(())
    })
}

/// Read-modify-write: hands the persisted record to `edit` and writes back whatever it leaves.
///
/// A persisted blob that cannot be parsed cannot be merged into; `edit` then starts from an
/// empty record. Nothing is written if `edit` fails.
pub fn merge_update<S, F>(storage: &S, edit: F) -> Result<(), NavGateError>
where
    S: SessionStorage + ?Sized,
    F: FnOnce(&mut Map<String, Value>) -> Result<(), NavGateError>,
{
    let mut record = match read_record(storage) {
        Ok(Some(map)) => map,
        Ok(None) => Map::new(),
        Err(NavGateError::Io(e)) => return Err(NavGateError::Io(e)),
        Err(e) => {
            warn!("Discarding unreadable session record before writing: {}", e);
            Map::new()
        }
    };
    edit(&mut record)?;
    let contents = serde_json::to_string_pretty(&Value::Object(record))?;
    storage.save(&contents)
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
