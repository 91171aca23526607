//! semconv-checker - unified CLI entrypoint.
//!
//! Usage:
//!   semconv-checker start --config config/checker.toml [--one-shot]
//!   semconv-checker check <export.pb>
//!   semconv-checker config validate
//!   semconv-checker catalog list

use clap::Parser;
use semconv_checker::cli::commands::{run_catalog, run_check, run_config, run_start};
use semconv_checker::cli::{Cli, Commands};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config/checker.toml"));
    let log_level = cli.log_level;

    let result = match cli.command {
        Commands::Start(args) => run_start(&config_path, log_level, args).await,
        Commands::Check(args) => run_check(&config_path, log_level, args),
        Commands::Config(args) => run_config(&config_path, args),
        Commands::Catalog(args) => run_catalog(&config_path, args),
    };

    match result {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
