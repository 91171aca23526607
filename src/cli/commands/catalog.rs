//! Catalog inspection commands.

use super::load_config;
use crate::core::config::ConfigOverrides;
use crate::engine::verdict::ExitStatus;
use crate::semconv::catalog::{GroupCatalog, SchemaCatalog};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Inspect the semantic convention catalog.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog file; defaults to the one named by the config.
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CatalogCommand,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List group ids.
    List,
    /// Show the resolved attributes of one group.
    Show {
        /// Group id.
        group: String,
        /// Output format (text, json).
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Run the catalog command.
pub fn run_catalog(config_path: &Path, args: CatalogArgs) -> Result<ExitStatus> {
    let path = match args.file {
        Some(file) => file,
        None => PathBuf::from(load_config(config_path, &ConfigOverrides::default())?.catalog.path),
    };
    let catalog = GroupCatalog::from_file(&path)?;

    match args.command {
        CatalogCommand::List => list_groups(&catalog),
        CatalogCommand::Show { group, format } => show_group(&catalog, &group, &format)?,
    }
    Ok(ExitStatus::Clean)
}

fn list_groups(catalog: &GroupCatalog) {
    println!("version: {}", catalog.version());
    for id in catalog.ids() {
        let count = catalog.group(id).map_or(0, |g| g.len());
        match catalog.brief(id) {
            Some(brief) => println!("  {:<40} {:>3}  {}", id, count, brief),
            None => println!("  {:<40} {:>3}", id, count),
        }
    }
}

fn show_group(catalog: &GroupCatalog, id: &str, format: &str) -> Result<()> {
    let Some(attributes) = catalog.group(id) else {
        anyhow::bail!("unknown group: {}", id);
    };
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(attributes)?),
        _ => {
            println!("{}", id);
            if let Some(brief) = catalog.brief(id) {
                println!("  {}", brief);
            }
            for key in attributes.iter() {
                println!("  - {}", key);
            }
        }
    }
    Ok(())
}
