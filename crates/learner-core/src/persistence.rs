//! Key/value persistence for the store document.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{LearnerError, StorageError};
use crate::store::{GameRecord, Metadata, PositionRecord, StoreDocument};

/// Key under which the whole document is stored.
pub const STORAGE_KEY: &str = "position_learner";

/// A get/set string store. Absent keys read as `None`.
pub trait StorageBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile backend, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a failed
/// write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }
}

/// Borrowed view of a document with its metadata replaced, for saving
/// without touching the live store.
#[derive(Serialize)]
pub(crate) struct DocumentView<'a> {
    pub positions: &'a BTreeMap<String, PositionRecord>,
    pub games: &'a [GameRecord],
    pub metadata: Metadata,
}

/// Parse and validate a persisted or imported document.
pub fn decode_document(text: &str) -> Result<StoreDocument, LearnerError> {
    let doc: StoreDocument = serde_json::from_str(text)?;
    doc.validate()?;
    Ok(doc)
}

pub fn encode_document(doc: &StoreDocument) -> Result<String, LearnerError> {
    Ok(serde_json::to_string_pretty(doc)?)
}
