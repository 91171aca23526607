//! Start command implementation.

use super::{init_logging, load_config};
use crate::core::config::ConfigOverrides;
use crate::core::runtime::{RunOutcome, Runtime};
use crate::engine::verdict::ExitStatus;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Start the OTLP receiver.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Override the bind address.
    #[arg(long)]
    pub bind: Option<String>,

    /// Exit after the first export call: 0 if compliant, 100 otherwise.
    #[arg(long)]
    pub one_shot: bool,

    /// Log metrics that no rule matched.
    #[arg(long)]
    pub report_unmatched: bool,

    /// Override the catalog path.
    #[arg(long)]
    pub catalog: Option<String>,
}

/// Run the start command with the given config path.
pub async fn run_start(
    config_path: &Path,
    log_level: Option<String>,
    args: StartArgs,
) -> Result<ExitStatus> {
    let overrides = ConfigOverrides {
        log_level,
        bind: args.bind,
        catalog: args.catalog,
        one_shot: args.one_shot,
        report_unmatched: args.report_unmatched,
    };
    let config = load_config(config_path, &overrides)?;
    init_logging(&config);

    let one_shot = config.server.one_shot;
    let mut runtime = Runtime::new(config)?;
    let outcome = runtime.run().await?;
    exit_status_for(outcome, one_shot)
}

/// Map how the runtime ended to a process status.
///
/// A one-shot run that stops without a verdict checked nothing, so it
/// cannot report a clean result.
fn exit_status_for(outcome: RunOutcome, one_shot: bool) -> Result<ExitStatus> {
    match outcome {
        RunOutcome::OneShot(verdict) => {
            let status = verdict.exit_status();
            tracing::info!(
                violations = verdict.violation_count,
                exit_code = status.code(),
                "one-shot run finished"
            );
            Ok(status)
        }
        RunOutcome::Stopped if one_shot => {
            anyhow::bail!("one-shot run stopped before any export call was checked")
        }
        RunOutcome::Stopped => Ok(ExitStatus::Clean),
    }
}
