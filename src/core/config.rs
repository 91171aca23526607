//! Configuration parsing and validation.
//!
//! Checker configuration is loaded from TOML files with CLI overrides.
//! Pattern compilation and group resolution happen later, in
//! [`crate::engine::match_table`], against the loaded catalog.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Top-level checker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listener and mode settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Semantic convention catalog location.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Attributes every resource must carry.
    #[serde(default)]
    pub resource: ResourceRuleConfig,

    /// Metric match rules, applied in declaration order.
    #[serde(default)]
    pub metrics: Vec<MetricRuleConfig>,

    /// Logging configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Listener and mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// OTLP/gRPC bind address.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Exit after the first export call with a status reflecting compliance.
    #[serde(default)]
    pub one_shot: bool,

    /// Log metrics that no rule matched.
    #[serde(default)]
    pub report_unmatched: bool,

    /// Largest export message accepted, in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            one_shot: false,
            report_unmatched: false,
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

/// Catalog file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the group catalog TOML file.
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Resource-level requirements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRuleConfig {
    /// Groups whose attributes every resource must carry.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Keys never reported as missing or extra.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// One metric match rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRuleConfig {
    /// Regular expression matched against the metric name.
    #[serde(rename = "match")]
    pub pattern: String,

    /// Groups whose attributes matching metrics must carry.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Keys never reported as missing or extra.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:4317".to_string()
}

fn default_max_message_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_catalog_path() -> String {
    "config/semconv.toml".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A relative catalog path is resolved against the config file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| "failed to parse config file")?;
        config.validate()?;

        let catalog = Path::new(&config.catalog.path);
        if catalog.is_relative() && !catalog.exists() {
            if let Some(dir) = path.parent() {
                let candidate = dir.join(catalog);
                if candidate.exists() {
                    config.catalog.path = candidate.to_string_lossy().into_owned();
                }
            }
        }
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).with_context(|| "failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref log_level) = overrides.log_level {
            self.telemetry.log_level = log_level.clone();
        }
        if let Some(ref bind) = overrides.bind {
            self.server.bind = bind.clone();
        }
        if let Some(ref catalog) = overrides.catalog {
            self.catalog.path = catalog.clone();
        }
        if overrides.one_shot {
            self.server.one_shot = true;
        }
        if overrides.report_unmatched {
            self.server.report_unmatched = true;
        }
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.validate_server()?;
        self.validate_telemetry()?;
        self.validate_metrics()?;
        Ok(())
    }

    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("server.bind is not a socket address: {}", self.server.bind))
    }

    fn validate_server(&self) -> Result<()> {
        self.bind_addr()?;
        if self.server.max_message_bytes == 0 {
            anyhow::bail!("server.max_message_bytes must be greater than zero");
        }
        Ok(())
    }

    fn validate_telemetry(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "telemetry.log_level must be one of {:?}, got: {}",
                valid_levels,
                self.telemetry.log_level
            );
        }
        Ok(())
    }

    fn validate_metrics(&self) -> Result<()> {
        for (idx, rule) in self.metrics.iter().enumerate() {
            if rule.pattern.is_empty() {
                anyhow::bail!("metrics[{}].match must not be empty", idx);
            }
        }
        Ok(())
    }
}

/// CLI override options that can be applied to configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override log level.
    pub log_level: Option<String>,
    /// Override bind address.
    pub bind: Option<String>,
    /// Override catalog path.
    pub catalog: Option<String>,
    /// Force one-shot mode.
    pub one_shot: bool,
    /// Force unmatched-metric reporting.
    pub report_unmatched: bool,
}
