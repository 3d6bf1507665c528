//! Error types for the Switchboard CLI.

use switchboard_features::FeatureError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Feature store or configuration error
    #[error(transparent)]
    Features(#[from] FeatureError),

    /// JSON output error
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_failures_surface_through_features() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: CliError = FeatureError::from(io_err).into();

        assert!(matches!(err, CliError::Features(FeatureError::Io(_))));
        assert!(err.to_string().contains("gone"));
    }
}
