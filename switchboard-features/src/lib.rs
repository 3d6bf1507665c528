//! Layered feature flags for Switchboard
//!
//! Resolves feature flags from three layers and notifies observers when a
//! flag's effective value changes.
//!
//! # Features
//!
//! - **Overrides** - Explicit per-flag values persisted in a compact string
//! - **Fallback Signal** - Out-of-band comma separated list of active flags
//! - **Defaults** - Process-lifetime values below every other layer
//! - **Variants** - Flags hold either a boolean or a named variant
//! - **Watchers** - Per-flag callbacks plus an aggregate watch-list observer
//!
//! # Quick Start
//!
//! ```
//! use switchboard_features::*;
//!
//! let features = Features::new();
//!
//! features.enable("new-ui");
//! assert!(features.is_enabled("new-ui"));
//!
//! features.disable("new-ui");
//! assert_eq!(features.resolve("new-ui"), FlagValue::Boolean(false));
//! ```
//!
//! # Precedence
//!
//! ```
//! use switchboard_features::*;
//!
//! let features = Features::builder()
//!     .fallback(StaticFallback::new("beta"))
//!     .build()
//!     .unwrap();
//!
//! features.set_default("beta", "control");
//! assert!(features.is_enabled("beta"));        // fallback beats default
//!
//! features.disable("beta");
//! assert!(!features.is_enabled("beta"));       // override beats fallback
//!
//! features.remove("beta");
//! assert!(features.is_enabled("beta"));
//! ```
//!
//! # Persistence
//!
//! ```no_run
//! use switchboard_features::*;
//!
//! let features = Features::builder()
//!     .config(FeaturesConfig::new().with_key("flags"))
//!     .storage(JsonFileStore::new("flags.json"))
//!     .fallback(EnvFallback::new(Some("MYAPP".to_string())))
//!     .build()
//!     .unwrap();
//!
//! features.set("theme", "dark");
//! ```
//!
//! # Watching
//!
//! ```
//! use switchboard_features::*;
//!
//! let features = Features::new();
//!
//! let list = features.watch_list(|names| println!("watched: {:?}", names));
//! let theme = features.watch_variant("theme", "dark", |value| {
//!     println!("theme is now {}", value);
//! });
//!
//! features.set("theme", "dark");
//!
//! theme.dispose();
//! list.dispose();
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod emitter;
pub mod error;
pub mod features;
pub mod flag;
pub mod store;
pub mod watch;

pub use backend::{
    EnvFallback, FallbackSource, JsonFileStore, MemoryStore, NoFallback, StaticFallback,
    StorageBackend,
};
pub use config::FeaturesConfig;
pub use emitter::{Emitter, ListenerId, Registration};
pub use error::{CodecError, FeatureError, Result};
pub use features::{Features, FeaturesBuilder};
pub use flag::{FeatureSet, FlagValue};
pub use store::FlagStore;
pub use watch::Subscription;
