//! Object storage engine
//!
//! [`Storage`] owns the in-memory [`Index`] and the [`Backend`] it is flushed
//! to. Every flush writes the whole index. Visible state between requests
//! always equals durable state: mutations left unflushed when a
//! [`Transaction`] ends are discarded, and the next access reloads from the
//! backend first.
//!
//! Locking: readers share the index; a [`Transaction`] holds it exclusively
//! from its first mutation through the flush. Do not call [`Storage`]
//! methods while holding a transaction on the same store; they wait for it.

pub mod backend;
pub mod index;

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

use models::{EntityKind, Instance};

use crate::errors::ServiceError;
use crate::metrics;

pub use backend::{Backend, JsonFileBackend, MemoryBackend};
pub use index::{Index, PlaceSearch};

pub struct Storage {
    index: RwLock<Index>,
    backend: Arc<dyn Backend>,
}

async fn load_index(backend: &dyn Backend) -> Index {
    let index = match backend.load().await {
        Ok(Some(bytes)) => {
            let (index, skipped) = Index::decode(&bytes);
            metrics::record_reload(if skipped == 0 { "loaded" } else { "corrupt" });
            index
        }
        Ok(None) => {
            debug!(backend = %backend.describe(), "no snapshot yet; starting empty");
            metrics::record_reload("empty");
            Index::default()
        }
        Err(e) => {
            warn!(backend = %backend.describe(), error = %e, "cannot read snapshot; starting empty");
            metrics::record_reload("failed");
            Index::default()
        }
    };
    metrics::record_objects(&index);
    index
}

impl Storage {
    /// Engine over `backend` with an empty index; call [`Storage::reload`] before use.
    pub fn new(backend: Arc<dyn Backend>) -> Arc<Self> {
        Arc::new(Self { index: RwLock::new(Index::default()), backend })
    }

    /// Construct and reload in one step.
    pub async fn open(backend: Arc<dyn Backend>) -> Arc<Self> {
        let storage = Self::new(backend);
        storage.reload().await;
        storage
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Replace the index with the backend's last snapshot.
    ///
    /// Absent or corrupt data yields an empty store; this never fails.
    pub async fn reload(&self) {
        let mut guard = self.index.write().await;
        *guard = load_index(self.backend.as_ref()).await;
        info!(backend = %self.backend.describe(), objects = guard.count(None), "storage reloaded");
    }

    async fn fresh_guard(&self) -> RwLockWriteGuard<'_, Index> {
        let mut guard = self.index.write().await;
        if guard.is_dirty() {
            warn!("discarding unflushed changes from an abandoned transaction");
            *guard = load_index(self.backend.as_ref()).await;
        }
        guard
    }

    /// Shared read access to a clean index.
    ///
    /// Only an abandoned transaction's leftovers make this take the write lock.
    pub async fn read(&self) -> RwLockReadGuard<'_, Index> {
        let guard = self.index.read().await;
        if !guard.is_dirty() {
            return guard;
        }
        drop(guard);
        self.fresh_guard().await.downgrade()
    }

    /// Exclusive access for a mutate + flush unit.
    pub async fn begin(&self) -> Transaction<'_> {
        Transaction { index: self.fresh_guard().await, backend: self.backend.as_ref() }
    }

    pub async fn get(&self, kind: EntityKind, id: &str) -> Option<Instance> {
        self.read().await.get(kind, id).cloned()
    }

    pub async fn all(&self, kind: Option<EntityKind>) -> BTreeMap<String, Instance> {
        self.read().await.all(kind)
    }

    pub async fn count(&self, kind: Option<EntityKind>) -> usize {
        self.read().await.count(kind)
    }

    /// Shutdown: drop anything not flushed so the process exits on durable state.
    pub async fn close(&self) {
        let mut guard = self.index.write().await;
        if guard.is_dirty() {
            warn!("closing storage with unflushed changes; discarding them");
            *guard = load_index(self.backend.as_ref()).await;
        }
        info!(backend = %self.backend.describe(), "storage closed");
    }
}

/// Exclusive session over the index.
///
/// Reads go through `Deref<Target = Index>`. Mutations stay in memory until
/// [`Transaction::save`]; whatever is unflushed when the transaction ends is
/// discarded.
pub struct Transaction<'a> {
    index: RwLockWriteGuard<'a, Index>,
    backend: &'a dyn Backend,
}

impl Deref for Transaction<'_> {
    type Target = Index;

    fn deref(&self) -> &Index {
        &self.index
    }
}

impl Transaction<'_> {
    /// Register an instance; re-adding the same type and id overwrites.
    pub fn add(&mut self, instance: Instance) -> Option<Instance> {
        self.index.add(instance)
    }

    /// Remove an instance with cascade; see [`Index::delete`].
    pub fn delete(&mut self, kind: EntityKind, id: &str) -> Vec<String> {
        let removed = self.index.delete(kind, id);
        if !removed.is_empty() {
            debug!(%kind, %id, removed = removed.len(), "deleted with cascade");
        }
        removed
    }

    pub fn link_amenity(&mut self, place_id: &str, amenity_id: &str) -> Result<bool, ServiceError> {
        self.index.link_amenity(place_id, amenity_id)
    }

    pub fn unlink_amenity(&mut self, place_id: &str, amenity_id: &str) -> Result<bool, ServiceError> {
        self.index.unlink_amenity(place_id, amenity_id)
    }

    /// Flush the whole index to the backend.
    pub async fn save(&mut self) -> Result<(), ServiceError> {
        let snapshot = self.index.encode()?;
        match self.backend.store(snapshot).await {
            Ok(()) => {
                self.index.mark_clean();
                metrics::record_flush(true);
                metrics::record_objects(&self.index);
                debug!(objects = self.index.count(None), "storage flushed");
                Ok(())
            }
            Err(e) => {
                metrics::record_flush(false);
                error!(backend = %self.backend.describe(), error = %e, "storage flush failed");
                Err(e)
            }
        }
    }

    /// Persist one instance: refresh `updated_at`, add, flush.
    ///
    /// A user whose email another user already has is refused with `Conflict`.
    pub async fn put(&mut self, mut instance: Instance) -> Result<Instance, ServiceError> {
        self.index.check_unique(&instance)?;
        instance.touch();
        self.add(instance.clone());
        self.save().await?;
        Ok(instance)
    }

    /// Remove with cascade and flush. Returns the removed keys.
    pub async fn remove(&mut self, kind: EntityKind, id: &str) -> Result<Vec<String>, ServiceError> {
        let removed = self.delete(kind, id);
        self.save().await?;
        Ok(removed)
    }

    /// End the session now, discarding anything unflushed.
    pub async fn close(mut self) {
        if self.index.is_dirty() {
            debug!("transaction closed with unflushed changes; reloading");
            *self.index = load_index(self.backend).await;
        }
    }
}
