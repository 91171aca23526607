//! Log events produced by a compliance check.
//!
//! The traversal returns events as values; [`CheckEvent::emit`] forwards
//! them to `tracing` with a `section` tag so a log pipeline can filter
//! resource findings from metric findings.

use serde::Serialize;
use std::fmt;

/// Which level of the batch an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Resource,
    Metric,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Metric => "metric",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding from a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CheckEvent {
    /// Declared schema URL differs from the expected one. Informational.
    VersionMismatch {
        section: Section,
        scope: Option<String>,
        version: String,
        expected: String,
    },
    /// Attribute differences for a resource or a matched metric.
    Attributes {
        section: Section,
        version: String,
        scope: Option<String>,
        metric: Option<String>,
        missing: Vec<String>,
        extra: Vec<String>,
    },
    /// No rule matched the metric.
    UnmatchedMetric { scope: String, metric: String },
    /// Metric data is not a gauge or sum and was skipped.
    UnsupportedMetric {
        scope: String,
        metric: String,
        kind: String,
    },
}

impl CheckEvent {
    /// Section tag of the event.
    pub fn section(&self) -> Section {
        match self {
            Self::VersionMismatch { section, .. } | Self::Attributes { section, .. } => *section,
            Self::UnmatchedMetric { .. } | Self::UnsupportedMetric { .. } => Section::Metric,
        }
    }

    /// Write the event to the installed tracing subscriber.
    pub fn emit(&self) {
        match self {
            Self::VersionMismatch {
                section,
                scope,
                version,
                expected,
            } => match scope {
                Some(scope) => tracing::info!(
                    section = %section,
                    scope.name = %scope,
                    version = %version,
                    expected = %expected,
                    "incorrect scope version"
                ),
                None => tracing::info!(
                    section = %section,
                    version = %version,
                    expected = %expected,
                    "incorrect resource version"
                ),
            },
            Self::Attributes {
                section,
                version,
                scope,
                metric,
                missing,
                extra,
            } => {
                let scope = scope.as_deref().unwrap_or_default();
                let metric = metric.as_deref().unwrap_or_default();
                if !missing.is_empty() {
                    tracing::warn!(
                        section = %section,
                        version = %version,
                        scope.name = %scope,
                        name = %metric,
                        missing = ?missing,
                        "missing attributes"
                    );
                }
                if !extra.is_empty() {
                    tracing::info!(
                        section = %section,
                        version = %version,
                        scope.name = %scope,
                        name = %metric,
                        extra = ?extra,
                        "extra attributes"
                    );
                }
            }
            Self::UnmatchedMetric { scope, metric } => tracing::info!(
                section = %Section::Metric,
                scope.name = %scope,
                name = %metric,
                "unmatched metric"
            ),
            Self::UnsupportedMetric {
                scope,
                metric,
                kind,
            } => tracing::warn!(
                section = %Section::Metric,
                scope.name = %scope,
                name = %metric,
                kind = %kind,
                "unsupported metric type"
            ),
        }
    }
}
