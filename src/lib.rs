// Switchboard - layered client-side feature flags
//
// Explicit overrides persisted in a compact string, an out-of-band fallback
// signal, process-lifetime defaults, and change watchers.

// Re-export the flag engine
pub use switchboard_features::*;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        FallbackSource, FeatureSet, Features, FeaturesConfig, FlagValue, StorageBackend,
        Subscription,
    };
}
