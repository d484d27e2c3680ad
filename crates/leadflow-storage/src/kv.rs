//! Key-value store abstraction
//!
//! The pipeline's persistence collaborator: `get(key) -> Option<String>`,
//! `set(key, value)`. Every repository receives an injected
//! `Arc<dyn KvStore>` so components stay testable with the in-memory
//! implementation.

use async_trait::async_trait;
use leadflow_common::config::StorageConfig;
use leadflow_common::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Key-value store trait
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the document stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Local filesystem store: one `<key>.json` document per key
pub struct FileKvStore {
    base_path: PathBuf,
}

impl FileKvStore {
    /// Create a new file-backed store from config
    pub fn new(config: &StorageConfig) -> Result<Self> {
        Self::from_path(&config.path)
    }

    /// Create a new file-backed store rooted at `path`
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::Storage(format!("Failed to create store directory: {}", e)))?;

        info!(path = %path.display(), "Initialized file-backed key-value store");

        Ok(Self {
            base_path: path.to_path_buf(),
        })
    }

    /// Resolve the document path for a key. Keys are flat identifiers;
    /// anything that could escape the base directory is rejected.
    fn document_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(Error::Storage("Empty key is not allowed".to_string()));
        }

        let valid = key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Storage(format!(
                "Invalid key '{}': only alphanumerics, '_' and '-' are allowed",
                key
            )));
        }

        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key)?;

        match fs::read_to_string(&path).await {
            Ok(value) => {
                debug!(key = %key, size = value.len(), "Read document");
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read document '{}': {}",
                key, e
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.document_path(key)?;

        // Write through a temp file so a crash mid-write never leaves a
        // truncated document behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write document '{}': {}", key, e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Storage(format!("Failed to commit document '{}': {}", key, e)))?;

        debug!(key = %key, size = value.len(), "Wrote document");

        Ok(())
    }
}

/// In-memory store used by tests and ephemeral deployments
#[derive(Default)]
pub struct MemoryKvStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Create a key-value store from configuration
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn KvStore>> {
    match config.backend.as_str() {
        "fs" => Ok(Arc::new(FileKvStore::new(config)?)),
        "memory" => Ok(Arc::new(MemoryKvStore::new())),
        other => Err(Error::Config(format!(
            "Unsupported storage backend: {}",
            other
        ))),
    }
}
