//! Environment/runtime helpers
//!
//! Sanity checks to ensure the storage directory exists at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the parent directory of the storage file exists.
///
/// A path without a parent (bare file name) is stored in the working directory.
pub async fn ensure_storage_dir(storage_path: &str) -> anyhow::Result<()> {
    let parent = match Path::new(storage_path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => {
            debug!(%storage_path, "storage file has no parent directory; using cwd");
            return Ok(());
        }
    };
    if tokio::fs::metadata(parent).await.is_err() {
        warn!(dir = %parent.display(), "storage directory not found; creating it");
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    Ok(())
}
