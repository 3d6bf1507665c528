//! Mutation commands - enable, disable, set, remove, reset.

use colored::Colorize;
use switchboard_features::{Features, FlagValue, codec};

use super::check_name;
use crate::error::{CliError, CliResult};

pub fn enable(features: &Features, name: &str) -> CliResult<()> {
    set(features, name, FlagValue::Boolean(true))
}

pub fn disable(features: &Features, name: &str) -> CliResult<()> {
    set(features, name, FlagValue::Boolean(false))
}

/// Override a flag with a variant value.
pub fn set_variant(features: &Features, name: &str, variant: &str) -> CliResult<()> {
    if !codec::is_valid_variant(variant) {
        return Err(CliError::InvalidArgument(format!(
            "variant {:?} must not contain '!', '*' or '|'",
            variant
        )));
    }
    set(features, name, FlagValue::variant(variant))
}

fn set(features: &Features, name: &str, value: FlagValue) -> CliResult<()> {
    check_name(name)?;
    features.set(name, value.clone());
    crate::success(&format!("{} = {}", name.bold(), value));
    Ok(())
}

pub fn remove(features: &Features, name: &str) -> CliResult<()> {
    check_name(name)?;
    if !features.overrides().contains_key(name) {
        crate::warn(&format!("{} has no override", name));
        return Ok(());
    }

    features.remove(name);
    crate::success(&format!(
        "Removed override for {} (now {})",
        name.bold(),
        features.resolve(name)
    ));
    Ok(())
}

pub fn reset(features: &Features) -> CliResult<()> {
    let count = features.overrides().len();
    features.reset();
    crate::success(&format!("Cleared {} override(s)", count));
    Ok(())
}
