//! Switchboard CLI - inspect and override feature flags.
//!
//! # Commands
//!
//! - `switchboard get <name>` - Print a flag's resolved value
//! - `switchboard enable <name>` - Override a flag to `true`
//! - `switchboard disable <name>` - Override a flag to `false`
//! - `switchboard set <name> <variant>` - Override a flag with a variant
//! - `switchboard remove <name>` - Drop a flag's override
//! - `switchboard reset` - Drop every override
//! - `switchboard list` - Show overrides and the fallback signal
//! - `switchboard raw` - Print the persisted string
//!
//! Overrides live in a JSON file (`--store`, default `.switchboard.json`).
//! The fallback signal is read from `SWITCHBOARD_<KEY>`, e.g.
//! `SWITCHBOARD_FEATURES=beta,gamma`.

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use switchboard_features::{EnvFallback, Features, FeaturesConfig, JsonFileStore};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;

use commands::{get, list, mutate};
use error::CliResult;

/// Environment prefix for configuration and the fallback signal.
const ENV_PREFIX: &str = "SWITCHBOARD";

/// Switchboard CLI - Feature flag overrides
#[derive(Parser)]
#[command(name = "switchboard")]
#[command(version)]
#[command(about = "Inspect and override Switchboard feature flags")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file holding persisted overrides
    #[arg(long, global = true, env = "SWITCHBOARD_STORE", default_value = ".switchboard.json")]
    store: PathBuf,

    /// TOML configuration file
    #[arg(long, global = true, env = "SWITCHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Key overrides are persisted under
    #[arg(long, global = true)]
    key: Option<String>,

    /// Print machine readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a flag's resolved value
    Get {
        name: String,

        /// Resolve from overrides only
        #[arg(long)]
        ignore_fallback: bool,
    },

    /// Override a flag to true
    #[command(visible_alias = "on")]
    Enable { name: String },

    /// Override a flag to false
    #[command(visible_alias = "off")]
    Disable { name: String },

    /// Override a flag with a variant value
    Set { name: String, variant: String },

    /// Drop a flag's override
    #[command(visible_alias = "rm")]
    Remove { name: String },

    /// Drop every override
    Reset,

    /// Show overrides and the fallback signal
    #[command(visible_alias = "ls")]
    List,

    /// Print the persisted string
    Raw,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(cli: &Cli) -> CliResult<Features> {
    let mut config = match cli.config {
        Some(ref path) => FeaturesConfig::from_file(path)?,
        None => FeaturesConfig::from_env(ENV_PREFIX)?,
    };
    if let Some(ref key) = cli.key {
        config = config.with_key(key.clone());
    }

    let features = Features::builder()
        .config(config)
        .storage(JsonFileStore::new(&cli.store))
        .fallback(EnvFallback::new(Some(ENV_PREFIX.to_string())))
        .build()?;

    tracing::debug!("Opened {} with key {:?}", cli.store.display(), features.config().key);
    Ok(features)
}

fn run(cli: Cli) -> CliResult<()> {
    let features = open(&cli)?;

    match cli.command {
        Commands::Get {
            ref name,
            ignore_fallback,
        } => get::run(&features, name, ignore_fallback, cli.json),
        Commands::Enable { ref name } => mutate::enable(&features, name),
        Commands::Disable { ref name } => mutate::disable(&features, name),
        Commands::Set {
            ref name,
            ref variant,
        } => mutate::set_variant(&features, name, variant),
        Commands::Remove { ref name } => mutate::remove(&features, name),
        Commands::Reset => mutate::reset(&features),
        Commands::List => list::run(&features, cli.json),
        Commands::Raw => list::raw(&features),
    }
}

fn success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg);
}

fn warn(msg: &str) {
    println!("  {} {}", "⚠".yellow().bold(), msg.yellow());
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
