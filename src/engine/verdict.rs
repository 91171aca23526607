//! Verdict aggregation and response shaping.
//!
//! A [`Verdict`] is the fold of every metric comparison in one export call.
//! It is rendered once, either as a process exit status (one-shot and
//! `check`) or as an OTLP export response (service mode).

use crate::adapters::otlp::proto::{ExportMetricsPartialSuccess, ExportMetricsServiceResponse};
use crate::core::error::GrpcCode;
use crate::engine::events::CheckEvent;
use serde::Serialize;

/// Exit code when every matched metric carried its required attributes.
pub const EXIT_CLEAN: u8 = 0;

/// Exit code when at least one required attribute was missing.
pub const EXIT_VIOLATIONS: u8 = 100;

/// Message carried in the partial-success payload of a rejection.
pub const REJECTION_MESSAGE: &str = "missing attributes";

/// Accumulated outcome of one export call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Missing required attributes across all matched metrics.
    pub violation_count: u64,
    /// Scope name recorded for every rule match, in traversal order.
    pub implicated_scopes: Vec<String>,
}

impl Verdict {
    /// Verdict for a single rule match.
    pub fn for_match(scope: &str, missing: usize) -> Self {
        Self {
            violation_count: missing as u64,
            implicated_scopes: vec![scope.to_string()],
        }
    }

    /// Combine two verdicts; `self` comes first in scope order.
    pub fn merge(mut self, other: Verdict) -> Self {
        self.violation_count += other.violation_count;
        self.implicated_scopes.extend(other.implicated_scopes);
        self
    }

    pub fn is_clean(&self) -> bool {
        self.violation_count == 0
    }

    /// Status a one-shot invocation terminates with.
    pub fn exit_status(&self) -> ExitStatus {
        if self.is_clean() {
            ExitStatus::Clean
        } else {
            ExitStatus::ViolationsFound
        }
    }

    /// Shape the OTLP response for this verdict.
    pub fn render(&self) -> RenderedResponse {
        if self.is_clean() {
            return RenderedResponse {
                response: ExportMetricsServiceResponse::default(),
                rejection: None,
            };
        }
        RenderedResponse {
            response: ExportMetricsServiceResponse {
                partial_success: Some(ExportMetricsPartialSuccess {
                    rejected_data_points: i64::try_from(self.violation_count).unwrap_or(i64::MAX),
                    error_message: REJECTION_MESSAGE.to_string(),
                }),
            },
            rejection: Some(Rejection {
                code: GrpcCode::FailedPrecondition,
                message: format!(
                    "{}: [{}]",
                    REJECTION_MESSAGE,
                    self.implicated_scopes.join(" ")
                ),
            }),
        }
    }
}

/// Final status of a one-shot or batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitStatus {
    Clean,
    ViolationsFound,
}

impl ExitStatus {
    /// Process exit code.
    pub fn code(self) -> u8 {
        match self {
            Self::Clean => EXIT_CLEAN,
            Self::ViolationsFound => EXIT_VIOLATIONS,
        }
    }
}

/// Failure status that accompanies a rejecting response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: GrpcCode,
    pub message: String,
}

/// Response body plus an optional failure status.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
    pub response: ExportMetricsServiceResponse,
    pub rejection: Option<Rejection>,
}

/// Everything one check produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub verdict: Verdict,
    pub events: Vec<CheckEvent>,
    /// Traversal stopped early on a shutdown signal.
    pub cancelled: bool,
}

impl CheckReport {
    /// Combine reports, keeping event order.
    pub fn merge(mut self, other: CheckReport) -> Self {
        self.verdict = self.verdict.merge(other.verdict);
        self.events.extend(other.events);
        self.cancelled |= other.cancelled;
        self
    }

    /// Report holding only events.
    pub fn from_events(events: Vec<CheckEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    /// Forward every event to tracing.
    pub fn emit(&self) {
        for event in &self.events {
            event.emit();
        }
    }
}
