//! CLI command implementations.

pub mod get;
pub mod list;
pub mod mutate;

use crate::error::{CliError, CliResult};
use switchboard_features::codec;

/// Reject names the persisted format cannot represent.
pub fn check_name(name: &str) -> CliResult<()> {
    if codec::is_valid_name(name) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "flag name {:?} must be non-empty and must not contain '!', '*' or '|'",
            name
        )))
    }
}
