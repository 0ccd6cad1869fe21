use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::errors::ServiceError;

/// Backing medium the index is flushed to and reloaded from.
///
/// A backend only moves whole snapshots; encoding is the index's job.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Last flushed snapshot, or `Ok(None)` when nothing has been flushed yet.
    async fn load(&self) -> Result<Option<Vec<u8>>, ServiceError>;
    /// Replace the stored snapshot.
    async fn store(&self, snapshot: Vec<u8>) -> Result<(), ServiceError>;
    fn describe(&self) -> String;
}

/// Single JSON file, rewritten atomically on every flush.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    file_path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}

#[async_trait]
impl Backend for JsonFileBackend {
    async fn load(&self) -> Result<Option<Vec<u8>>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::Persistence(format!("read {}: {e}", self.file_path.display()))),
        }
    }

    async fn store(&self, snapshot: Vec<u8>) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Persistence(format!("create {}: {e}", parent.display())))?;
        }
        // write-then-rename so a crash never leaves a half-written snapshot
        let tmp = self.tmp_path();
        fs::write(&tmp, &snapshot)
            .await
            .map_err(|e| ServiceError::Persistence(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::Persistence(format!("rename to {}: {e}", self.file_path.display())))?;
        debug!(path = %self.file_path.display(), bytes = snapshot.len(), "snapshot written");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.file_path.display())
    }
}

/// Process-local snapshot; gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    snapshot: Mutex<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing snapshot bytes.
    pub fn with_snapshot(bytes: impl Into<Vec<u8>>) -> Self {
        Self { snapshot: Mutex::new(Some(bytes.into())) }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn load(&self) -> Result<Option<Vec<u8>>, ServiceError> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn store(&self, snapshot: Vec<u8>) -> Result<(), ServiceError> {
        *self.snapshot.lock().await = Some(snapshot);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
