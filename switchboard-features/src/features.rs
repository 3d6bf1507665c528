//! Flag resolution and mutation.
//!
//! A flag resolves, in order of precedence, to:
//!
//! 1. its explicit override, if the override set contains the name (even
//!    when the override is `false`);
//! 2. `true`, if the fallback signal lists the name;
//! 3. its registered default;
//! 4. `false`.

use crate::backend::{FallbackSource, MemoryStore, NoFallback, StorageBackend};
use crate::config::FeaturesConfig;
use crate::emitter::Emitter;
use crate::error::Result;
use crate::flag::{FeatureSet, FlagValue};
use crate::store::FlagStore;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub(crate) struct Shared {
    pub(crate) config: FeaturesConfig,
    pub(crate) store: FlagStore,
    pub(crate) defaults: RwLock<FeatureSet>,
    pub(crate) fallback: Arc<dyn FallbackSource>,
    pub(crate) watchers: Emitter<FlagValue, FlagValue>,
    pub(crate) list_watchers: Emitter<Vec<String>>,
}

/// Handle to a layered feature flag set.
///
/// Cloning is cheap; clones share the same overrides, defaults and
/// watchers. Independent instances share nothing.
///
/// # Examples
///
/// ```
/// use switchboard_features::{Features, FlagValue, StaticFallback};
///
/// let features = Features::builder()
///     .fallback(StaticFallback::new("beta,gamma"))
///     .build()
///     .unwrap();
///
/// assert!(features.is_enabled("beta"));
/// assert!(!features.is_enabled("delta"));
///
/// features.enable("delta").set("theme", "dark");
/// assert!(features.is_enabled("delta"));
/// assert_eq!(features.resolve("theme"), FlagValue::variant("dark"));
/// ```
#[derive(Clone)]
pub struct Features {
    pub(crate) shared: Arc<Shared>,
}

impl Features {
    /// Create an instance with default configuration, in-memory storage and
    /// no fallback signal.
    pub fn new() -> Self {
        Self::from_parts(
            FeaturesConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(NoFallback),
        )
    }

    pub fn builder() -> FeaturesBuilder {
        FeaturesBuilder::new()
    }

    fn from_parts(
        config: FeaturesConfig,
        primary: Arc<dyn StorageBackend>,
        secondary: Arc<dyn StorageBackend>,
        fallback: Arc<dyn FallbackSource>,
    ) -> Self {
        let store = FlagStore::new(config.key.clone(), config.degraded_key(), primary, secondary);

        Self {
            shared: Arc::new(Shared {
                config,
                store,
                defaults: RwLock::new(FeatureSet::new()),
                fallback,
                watchers: Emitter::new(),
                list_watchers: Emitter::new(),
            }),
        }
    }

    pub fn config(&self) -> &FeaturesConfig {
        &self.shared.config
    }

    pub fn store(&self) -> &FlagStore {
        &self.shared.store
    }

    // ========== Resolution ==========

    /// Effective value of a flag.
    pub fn resolve(&self, name: &str) -> FlagValue {
        self.resolve_with(name, false)
    }

    /// Effective value of a flag, optionally skipping the fallback signal.
    ///
    /// With `ignore_fallback` set, an unset flag resolves to `false`
    /// without consulting the fallback signal or the defaults.
    pub fn resolve_with(&self, name: &str, ignore_fallback: bool) -> FlagValue {
        match self.shared.store.get(name) {
            Some(value) => value,
            None if ignore_fallback => FlagValue::Boolean(false),
            None if self.in_fallback(name) => FlagValue::Boolean(true),
            None => self
                .shared
                .defaults
                .read()
                .get(name)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Whether a flag resolves to an active value.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.resolve(name).is_truthy()
    }

    /// Flag names listed by the fallback signal.
    pub fn fallback_list(&self) -> Vec<String> {
        self.shared
            .fallback
            .read_fallback(self.shared.config.fallback_key())
            .map(|signal| {
                signal
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn in_fallback(&self, name: &str) -> bool {
        self.fallback_list().iter().any(|listed| listed == name)
    }

    /// Snapshot of the explicit overrides
    pub fn overrides(&self) -> FeatureSet {
        self.shared.store.read()
    }

    /// Snapshot of the registered defaults
    pub fn defaults(&self) -> FeatureSet {
        self.shared.defaults.read().clone()
    }

    // ========== Mutation ==========

    /// Override a flag and notify its watchers with the new value.
    pub fn set(&self, name: &str, value: impl Into<FlagValue>) -> &Self {
        let value = value.into();
        self.shared.store.update(|features| {
            features.insert(name.to_string(), value.clone());
        });

        debug!("Set flag {} = {}", name, value);
        self.shared.watchers.emit(name, &value);
        self
    }

    pub fn enable(&self, name: &str) -> &Self {
        self.set(name, FlagValue::Boolean(true))
    }

    pub fn disable(&self, name: &str) -> &Self {
        self.set(name, FlagValue::Boolean(false))
    }

    /// Register a process-lifetime default for a flag.
    ///
    /// Defaults are never persisted and survive [`reset`](Self::reset).
    /// Watchers receive the flag's resolved value, which only changes if
    /// no override or fallback entry shadows the default.
    pub fn set_default(&self, name: &str, value: impl Into<FlagValue>) -> &Self {
        let value = value.into();
        debug!("Set default {} = {}", name, value);
        self.shared.defaults.write().insert(name.to_string(), value);

        self.notify(name);
        self
    }

    /// Drop a flag's override and notify watchers with its new resolution.
    pub fn remove(&self, name: &str) -> &Self {
        let removed = self.shared.store.update(|features| features.remove(name));

        if removed.is_some() {
            debug!("Removed flag override {}", name);
        }
        self.notify(name);
        self
    }

    /// Clear every override.
    ///
    /// Each watched flag is notified with its new resolution, then watch-list
    /// observers are notified.
    pub fn reset(&self) -> &Self {
        self.shared.store.write(None);
        debug!("Reset all flag overrides");

        for name in self.list() {
            self.notify(&name);
        }
        self.notify_list();
        self
    }

    fn notify(&self, name: &str) {
        let resolved = self.resolve(name);
        self.shared.watchers.emit(name, &resolved);
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Features")
            .field("config", &self.shared.config)
            .field("watched", &self.list())
            .finish()
    }
}

/// Builder for [`Features`].
pub struct FeaturesBuilder {
    config: FeaturesConfig,
    primary: Option<Arc<dyn StorageBackend>>,
    secondary: Option<Arc<dyn StorageBackend>>,
    fallback: Option<Arc<dyn FallbackSource>>,
}

impl FeaturesBuilder {
    pub fn new() -> Self {
        Self {
            config: FeaturesConfig::default(),
            primary: None,
            secondary: None,
            fallback: None,
        }
    }

    pub fn config(mut self, config: FeaturesConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the persistence key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = key.into();
        self
    }

    /// Primary storage backend (default: in-memory)
    pub fn storage(mut self, backend: impl StorageBackend + 'static) -> Self {
        self.primary = Some(Arc::new(backend));
        self
    }

    pub fn shared_storage(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.primary = Some(backend);
        self
    }

    /// Storage used when the primary backend is unsupported (default: in-memory)
    pub fn degraded_storage(mut self, backend: impl StorageBackend + 'static) -> Self {
        self.secondary = Some(Arc::new(backend));
        self
    }

    pub fn shared_degraded_storage(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.secondary = Some(backend);
        self
    }

    /// Fallback signal source (default: none)
    pub fn fallback(mut self, source: impl FallbackSource + 'static) -> Self {
        self.fallback = Some(Arc::new(source));
        self
    }

    /// Build the instance.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::Config`](crate::FeatureError::Config) if the
    /// configuration does not validate.
    pub fn build(self) -> Result<Features> {
        self.config.validate()?;

        Ok(Features::from_parts(
            self.config,
            self.primary.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            self.secondary.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            self.fallback.unwrap_or_else(|| Arc::new(NoFallback)),
        ))
    }
}

impl Default for FeaturesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
