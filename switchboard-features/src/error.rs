//! Error types for feature flag operations.
//!
//! Flag resolution and mutation never fail; these errors only surface from
//! the strict codec, configuration loading and file-backed storage helpers.

use thiserror::Error;

/// Result type for fallible feature flag operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Feature flag errors.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Persisted value could not be parsed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Invalid or unloadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file-backed storage, config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons an encoded feature string is rejected by the strict decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Text appeared before the first `!` or `*` marker
    #[error("unexpected text before first marker: {0:?}")]
    LeadingText(String),

    /// A marker was not followed by a token
    #[error("empty token after marker at byte {0}")]
    EmptyToken(usize),

    /// A variant token had more than one `|`
    #[error("too many separators in variant token: {0:?}")]
    AmbiguousVariant(String),

    /// A variant token had nothing after the `|`
    #[error("missing flag name in variant token: {0:?}")]
    MissingName(String),
}
