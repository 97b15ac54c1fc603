//! ---
//! ufs_section: "03-persistence-logging"
//! ufs_subsection: "module"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Local record storage and the onboarding profile."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::{PersistenceError, Result};

/// String-keyed record persisted as one JSON object file.
///
/// Every value is stored as a JSON string holding serialized JSON, the way a
/// browser's local storage holds it.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw string stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).map(|value| match value {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }))
    }

    /// Value under `key`, parsed from its stored JSON text.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Store a raw string under `key`, replacing any earlier value.
    ///
    /// A damaged record file is replaced rather than left blocking the write.
    pub fn set(&self, key: &str, raw: impl Into<String>) -> Result<()> {
        let (mut entries, _) = self.entries_for_write()?;
        entries.insert(key.to_string(), Value::String(raw.into()));
        self.write_entries(&entries)
    }

    /// Serialize `value` to JSON text and store it under `key`.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, serde_json::to_string(value)?)
    }

    /// Remove `key`. Returns whether it was present.
    ///
    /// A damaged record file is reset to an empty object.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let (mut entries, damaged) = self.entries_for_write()?;
        let removed = entries.remove(key).is_some();
        if removed || damaged {
            self.write_entries(&entries)?;
        }
        Ok(removed)
    }

    /// Entries to start a write from, and whether the file had to be
    /// discarded. IO failures still propagate.
    fn entries_for_write(&self) -> Result<(Map<String, Value>, bool)> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(err @ (PersistenceError::Json(_) | PersistenceError::NotAnObject(_))) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "local record unreadable; starting from an empty record"
                );
                Ok((Map::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        match serde_json::from_slice(&bytes)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(PersistenceError::NotAnObject(self.path.clone())),
        }
    }

    /// Replace the file atomically: a sibling temp file is written, then
    /// renamed over the record.
    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&serde_json::to_vec_pretty(entries)?)?;
        staged.flush()?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}
