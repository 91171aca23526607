//! Logging setup and export counters.
//!
//! The checker's findings are log events, so the subscriber configuration
//! here is the checker's primary output channel in service mode.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Log levels accepted by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a configured level, defaulting to info.
    pub fn parse(level: &str) -> Self {
        match level.to_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Directive understood by `EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is harmless;
/// the second install is ignored.
#[cfg(feature = "telemetry")]
pub fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(not(feature = "telemetry"))]
pub fn init_tracing(_level: LogLevel, _json: bool) {}

/// Counters over the lifetime of a service.
#[derive(Debug, Default)]
pub struct ExportStats {
    exports: AtomicU64,
    rejected: AtomicU64,
    violations: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`ExportStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStatsSnapshot {
    pub exports: u64,
    pub rejected: u64,
    pub violations: u64,
    pub failed: u64,
}

impl ExportStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed check.
    pub fn record_check(&self, violations: u64) {
        self.exports.fetch_add(1, Ordering::Relaxed);
        if violations > 0 {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            self.violations.fetch_add(violations, Ordering::Relaxed);
        }
    }

    /// Record a call that ended in an error status.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ExportStatsSnapshot {
        ExportStatsSnapshot {
            exports: self.exports.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            violations: self.violations.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
