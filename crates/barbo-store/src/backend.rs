//! Key-value backends for the metadata store.
//!
//! Two implementations of [`KeyValueBackend`]:
//!
//! - [`MemoryBackend`]: a map in process memory (tests, ephemeral runs)
//! - [`JsonFileBackend`]: one JSON object document on disk, rewritten
//!   atomically (temp file + rename) on every change
//!
//! ## Example
//!
//! ```rust,ignore
//! use barbo_store::backend::JsonFileBackend;
//!
//! let backend = JsonFileBackend::new("/home/me/.barbo/storage.json");
//! backend.set("settings", serde_json::json!({ "reviewCount": 8 })).await?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use barbo_core::{Error, KeyValueBackend, Result};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// In-process backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

/// Backend persisting every key into a single JSON object document.
///
/// A missing file reads as an empty document. The file mutex serializes
/// read-modify-write cycles across handles sharing this backend.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl JsonFileBackend {
    /// Backend over the document at `path`; the file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "json_store: document missing, starting empty");
                return Ok(Map::new());
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "json_store: read failed");
                return Err(Error::Store(format!("read {}: {}", self.path.display(), e)));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::Store(format!(
                "{} does not hold a JSON object (found {})",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }

    async fn write_document(&self, doc: &Map<String, Value>) -> Result<()> {
        let data = serde_json::to_vec_pretty(doc)?;
        debug!(path = %self.path.display(), size = data.len(), "json_store: write");
        write_atomic(&self.path, &data).await
    }
}

/// Replace the file at `path` with `data` via a synced temp file and rename,
/// creating parent directories as needed.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "json_store: create_dir_all failed");
                e
            })?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await.map_err(|e| {
        warn!(temp_path = %temp_path.display(), error = %e, "json_store: File::create failed");
        e
    })?;
    file.write_all(data).await.map_err(|e| {
        warn!(error = %e, "json_store: write_all failed");
        e
    })?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&temp_path, path).await.map_err(|e| {
        warn!(from = %temp_path.display(), to = %path.display(), error = %e, "json_store: rename failed");
        e
    })?;

    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl KeyValueBackend for JsonFileBackend {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.file_lock.lock().await;
        let mut doc = self.read_document().await?;
        Ok(doc.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.file_lock.lock().await;
        let mut doc = self.read_document().await?;
        doc.insert(key.to_string(), value);
        self.write_document(&doc).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.file_lock.lock().await;
        let mut doc = self.read_document().await?;
        if doc.remove(key).is_some() {
            self.write_document(&doc).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.file_lock.lock().await;
        self.write_document(&Map::new()).await
    }
}
