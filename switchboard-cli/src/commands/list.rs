//! List and raw commands - show persisted overrides and the fallback signal.

use colored::Colorize;
use serde_json::json;
use switchboard_features::{Features, FlagValue};

use crate::error::CliResult;

/// Print every override and every fallback-listed flag.
pub fn run(features: &Features, json: bool) -> CliResult<()> {
    let overrides = features.overrides();
    let fallback = features.fallback_list();

    if json {
        let out = json!({
            "key": features.config().key,
            "overrides": overrides,
            "fallback": fallback,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", "Overrides:".bright_white().bold());
    if overrides.is_empty() {
        println!("    {}", "(none)".dimmed());
    }
    for (name, value) in &overrides {
        let marker = match value {
            FlagValue::Boolean(true) => "✓".green(),
            FlagValue::Boolean(false) => "✗".red(),
            FlagValue::Variant(_) => "◆".cyan(),
        };
        println!("    {} {} = {}", marker, name, value);
    }

    println!();
    println!("  {}", "Fallback:".bright_white().bold());
    if fallback.is_empty() {
        println!("    {}", "(none)".dimmed());
    }
    for name in &fallback {
        let shadowed = overrides.contains_key(name);
        if shadowed {
            println!("    {} {} {}", "·".dimmed(), name, "(overridden)".dimmed());
        } else {
            println!("    {} {}", "✓".green(), name);
        }
    }
    println!();

    Ok(())
}

/// Print the encoded string exactly as persisted.
pub fn raw(features: &Features) -> CliResult<()> {
    if let Some(raw) = features.store().raw() {
        println!("{}", raw);
    }
    Ok(())
}
