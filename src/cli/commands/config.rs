//! Config command implementation.

use super::{compile_rules, load_config};
use crate::core::config::ConfigOverrides;
use crate::engine::verdict::ExitStatus;
use crate::semconv::catalog::SchemaCatalog;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;

/// Configuration operations.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Load config and catalog, and compile every rule.
    Validate,
    /// Print the effective configuration with defaults.
    Show {
        /// Output format (toml, json).
        #[arg(long, default_value = "toml")]
        format: String,
    },
}

/// Run the config command.
pub fn run_config(config_path: &Path, args: ConfigArgs) -> Result<ExitStatus> {
    match args.command {
        ConfigCommand::Validate => validate_config(config_path)?,
        ConfigCommand::Show { format } => show_config(config_path, &format)?,
    }
    Ok(ExitStatus::Clean)
}

fn validate_config(path: &Path) -> Result<()> {
    let config = load_config(path, &ConfigOverrides::default())?;
    println!("✓ Config file is valid: {}", path.display());

    let (catalog, rules) = compile_rules(&config)?;
    println!(
        "✓ Catalog loaded: {} groups, expected version {}",
        catalog.len(),
        catalog.version()
    );
    println!(
        "✓ Match table compiled: {} rule(s), {} required resource attribute(s)",
        rules.metrics.len(),
        rules.resource.required.len()
    );
    if rules.metrics.is_empty() {
        println!("  ⚠ Warning: no [[metrics]] rules; every metric passes unchecked");
    }
    Ok(())
}

fn show_config(path: &Path, format: &str) -> Result<()> {
    let config = load_config(path, &ConfigOverrides::default())?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        _ => println!("{}", toml::to_string_pretty(&config)?),
    }
    Ok(())
}
