//! Storage and fallback-signal capabilities.
//!
//! The flag store persists its encoded override string through a
//! [`StorageBackend`]; the resolution policy consults a [`FallbackSource`]
//! for the out-of-band list of active flags. Both are plain synchronous
//! capabilities: reads and writes are assumed local and fast.

use crate::error::Result;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Key-value persistence capability.
pub trait StorageBackend: Send + Sync {
    /// Whether the backend is usable.
    ///
    /// When this returns `false` the flag store switches to its degraded
    /// path (secondary backend, prefixed key).
    fn supported(&self) -> bool;

    /// Read the string stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`; `None` deletes the key.
    ///
    /// Writes never fail from the caller's point of view. Implementations
    /// that can fail internally log and swallow the error.
    fn write(&self, key: &str, value: Option<&str>);
}

/// Read-only source of the comma separated fallback flag list.
pub trait FallbackSource: Send + Sync {
    fn read_fallback(&self, key: &str) -> Option<String>;
}

/// In-memory storage backend.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    supported: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            supported: AtomicBool::new(true),
        }
    }

    /// Create a store that reports itself as unsupported.
    pub fn unsupported() -> Self {
        let store = Self::new();
        store.set_supported(false);
        store
    }

    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for MemoryStore {
    fn supported(&self) -> bool {
        self.supported.load(Ordering::SeqCst)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn write(&self, key: &str, value: Option<&str>) {
        let mut entries = self.entries.write();
        match value {
            Some(value) => {
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                entries.remove(key);
            }
        }
    }
}

/// Storage backend persisting all keys as one JSON object in a file.
///
/// A missing file reads as empty. Each write rewrites the whole file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored key.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON object of strings.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        let _guard = self.lock.read();
        self.load_unlocked()
    }

    fn load_unlocked(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Store or delete one key, rewriting the file.
    pub fn try_write(&self, key: &str, value: Option<&str>) -> Result<()> {
        let _guard = self.lock.write();
        let mut entries = self.load_unlocked()?;

        match value {
            Some(value) => {
                entries.insert(key.to_string(), value.to_string());
            }
            None => {
                entries.remove(key);
            }
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

impl StorageBackend for JsonFileStore {
    fn supported(&self) -> bool {
        true
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: Option<&str>) {
        if let Err(e) = self.try_write(key, value) {
            warn!("Failed to write {}: {}", self.path.display(), e);
        }
    }
}

/// Fallback source with a fixed signal string.
#[derive(Debug, Clone, Default)]
pub struct StaticFallback {
    signal: Option<String>,
}

impl StaticFallback {
    /// # Examples
    ///
    /// ```
    /// use switchboard_features::{FallbackSource, StaticFallback};
    ///
    /// let fallback = StaticFallback::new("beta,gamma");
    /// assert_eq!(fallback.read_fallback("features").as_deref(), Some("beta,gamma"));
    /// ```
    pub fn new(signal: impl Into<String>) -> Self {
        Self {
            signal: Some(signal.into()),
        }
    }

    /// Build the signal from a list of flag names
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let signal = flags
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(signal)
    }
}

impl FallbackSource for StaticFallback {
    fn read_fallback(&self, _key: &str) -> Option<String> {
        self.signal.clone()
    }
}

/// Fallback source reading `<PREFIX>_<KEY>` from the environment.
#[derive(Debug, Clone, Default)]
pub struct EnvFallback {
    prefix: Option<String>,
}

impl EnvFallback {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Environment variable consulted for `key`
    pub fn var_name(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl FallbackSource for EnvFallback {
    fn read_fallback(&self, key: &str) -> Option<String> {
        env::var(self.var_name(key)).ok()
    }
}

/// Fallback source that never lists anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl FallbackSource for NoFallback {
    fn read_fallback(&self, _key: &str) -> Option<String> {
        None
    }
}
