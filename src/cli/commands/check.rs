//! Offline check of an encoded export request.

use super::{compile_rules, init_logging, load_config};
use crate::adapters::otlp::service::decode_export_payload;
use crate::core::config::ConfigOverrides;
use crate::engine::traversal::Checker;
use crate::engine::verdict::ExitStatus;
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

/// Check an encoded `ExportMetricsServiceRequest`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Protobuf file, raw or with a gRPC frame header.
    pub input: PathBuf,

    /// Log metrics that no rule matched.
    #[arg(long)]
    pub report_unmatched: bool,

    /// Print the report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Run the check command. Exits 0 when clean and 100 on violations.
pub fn run_check(config_path: &Path, log_level: Option<String>, args: CheckArgs) -> Result<ExitStatus> {
    let overrides = ConfigOverrides {
        log_level,
        report_unmatched: args.report_unmatched,
        ..Default::default()
    };
    let config = load_config(config_path, &overrides)?;
    init_logging(&config);

    let (_, rules) = compile_rules(&config)?;
    let checker = Checker::new(rules);

    let payload = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let request = decode_export_payload(&payload)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;

    let report = checker.check(Some(&request));
    report.emit();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.verdict.is_clean() {
        println!("✓ {}: no missing attributes", args.input.display());
    } else {
        println!(
            "✗ {}: {} missing attribute(s) in scopes [{}]",
            args.input.display(),
            report.verdict.violation_count,
            report.verdict.implicated_scopes.join(" ")
        );
    }

    Ok(report.verdict.exit_status())
}
