//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};

/// semconv-checker - validate OTLP metrics against semantic conventions.
#[derive(Parser, Debug)]
#[command(name = "semconv-checker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path.
    #[arg(short, long, global = true, env = "SEMCONV_CHECKER_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the OTLP receiver.
    Start(commands::StartArgs),
    /// Check an encoded export request offline.
    Check(commands::CheckArgs),
    /// Configuration operations.
    Config(commands::ConfigArgs),
    /// Inspect the semantic convention catalog.
    Catalog(commands::CatalogArgs),
}
