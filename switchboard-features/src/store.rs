//! Cached, persisted override set.

use crate::backend::StorageBackend;
use crate::codec;
use crate::flag::{FeatureSet, FlagValue};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

/// Owns the decoded override set and mediates backend access.
///
/// Reads go through an in-memory cache that is populated lazily from the
/// backend. Writes go to the backend and replace the cache with exactly the
/// written value, so the cache is never stale after a write made here.
pub struct FlagStore {
    key: String,
    degraded_key: String,
    primary: Arc<dyn StorageBackend>,
    secondary: Arc<dyn StorageBackend>,
    cache: Mutex<Option<FeatureSet>>,
}

impl FlagStore {
    /// Create a store persisting under `key`.
    ///
    /// `secondary` is used with `degraded_key` whenever `primary` reports
    /// itself unsupported.
    pub fn new(
        key: impl Into<String>,
        degraded_key: impl Into<String>,
        primary: Arc<dyn StorageBackend>,
        secondary: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            key: key.into(),
            degraded_key: degraded_key.into(),
            primary,
            secondary,
            cache: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backend and key the next read or write will use
    fn target(&self) -> (&dyn StorageBackend, &str) {
        if self.primary.supported() {
            (self.primary.as_ref(), self.key.as_str())
        } else {
            (self.secondary.as_ref(), self.degraded_key.as_str())
        }
    }

    fn load(&self) -> FeatureSet {
        let (backend, key) = self.target();
        let raw = backend.read(key);
        trace!("Loading feature set from backend key {:?}", key);
        codec::decode(raw.as_deref())
    }

    fn cached<R>(&self, f: impl FnOnce(&mut FeatureSet) -> R) -> R {
        let mut cache = self.cache.lock();
        let features = cache.get_or_insert_with(|| self.load());
        f(features)
    }

    /// Current override set.
    pub fn read(&self) -> FeatureSet {
        self.cached(|features| features.clone())
    }

    /// Override for a single flag.
    pub fn get(&self, name: &str) -> Option<FlagValue> {
        self.cached(|features| features.get(name).cloned())
    }

    /// Persist a new override set; `None` clears it entirely.
    pub fn write(&self, features: Option<FeatureSet>) {
        let mut cache = self.cache.lock();
        self.persist(features.as_ref());
        *cache = Some(features.unwrap_or_default());
    }

    /// Read-modify-write under a single lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut FeatureSet) -> R) -> R {
        let mut cache = self.cache.lock();
        let mut features = cache.take().unwrap_or_else(|| self.load());
        let result = f(&mut features);
        self.persist(Some(&features));
        *cache = Some(features);
        result
    }

    /// Drop the cache so the next read reloads from the backend.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
    }

    /// Encoded string currently held by the backend
    pub fn raw(&self) -> Option<String> {
        let (backend, key) = self.target();
        backend.read(key)
    }

    fn persist(&self, features: Option<&FeatureSet>) {
        let encoded = codec::encode(features);
        let (backend, key) = self.target();
        backend.write(key, encoded.as_deref());
    }
}
