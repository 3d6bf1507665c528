//! Get command - resolve a single flag.

use serde_json::json;
use switchboard_features::Features;

use super::check_name;
use crate::error::CliResult;

/// Which layer a flag's value came from.
pub fn source(features: &Features, name: &str, ignore_fallback: bool) -> &'static str {
    if features.overrides().contains_key(name) {
        "override"
    } else if ignore_fallback {
        "unset"
    } else if features.fallback_list().iter().any(|f| f == name) {
        "fallback"
    } else if features.defaults().contains_key(name) {
        "default"
    } else {
        "unset"
    }
}

/// Print the resolved value of a flag.
pub fn run(features: &Features, name: &str, ignore_fallback: bool, json: bool) -> CliResult<()> {
    check_name(name)?;
    let value = features.resolve_with(name, ignore_fallback);

    if json {
        let out = json!({
            "name": name,
            "value": value,
            "enabled": value.is_truthy(),
            "source": source(features, name, ignore_fallback),
        });
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!("{}", value);
    }

    Ok(())
}
