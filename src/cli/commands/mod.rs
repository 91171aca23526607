//! CLI command implementations.

mod catalog;
mod check;
mod config;
mod start;

pub use catalog::{run_catalog, CatalogArgs};
pub use check::{run_check, CheckArgs};
pub use config::{run_config, ConfigArgs};
pub use start::{run_start, StartArgs};

use crate::core::config::{Config, ConfigOverrides};
use crate::engine::match_table::CompiledRules;
use crate::ops::telemetry::{init_tracing, LogLevel};
use crate::semconv::catalog::GroupCatalog;
use anyhow::{Context, Result};
use std::path::Path;

/// Load the config file and apply CLI overrides.
pub(crate) fn load_config(path: &Path, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = Config::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}

/// Load the catalog a config names and compile its rules against it.
pub(crate) fn compile_rules(config: &Config) -> Result<(GroupCatalog, CompiledRules)> {
    let catalog = GroupCatalog::from_file(Path::new(&config.catalog.path))?;
    let rules = CompiledRules::compile(config, &catalog).context("invalid match rules")?;
    Ok((catalog, rules))
}

/// Install the subscriber from the effective telemetry settings.
pub(crate) fn init_logging(config: &Config) {
    init_tracing(
        LogLevel::parse(&config.telemetry.log_level),
        config.telemetry.json,
    );
}
