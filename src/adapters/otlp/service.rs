//! Metrics export service.
//!
//! Runs the compliance engine for one export call, forwards the resulting
//! events to the log, and shapes the response. Transport-independent: the
//! gRPC wrapper in [`super::grpc`] and the `check` CLI both call into it.

use super::proto::ExportMetricsServiceRequest;
use crate::core::error::{CheckerError, CheckerResult};
use crate::engine::traversal::Checker;
use crate::engine::verdict::{RenderedResponse, Verdict};
use crate::ops::telemetry::ExportStats;
use parking_lot::Mutex;
use prost::Message;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

/// Hands the first verdict of a one-shot run to the runtime.
///
/// Later verdicts are dropped; the runtime decides the exit status once.
#[derive(Debug, Clone)]
pub struct VerdictSink {
    tx: Arc<Mutex<Option<oneshot::Sender<Verdict>>>>,
}

impl VerdictSink {
    /// Create a sink and the receiver the runtime waits on.
    pub fn channel() -> (Self, oneshot::Receiver<Verdict>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Offer a verdict. Returns true if this was the first one.
    pub fn offer(&self, verdict: Verdict) -> bool {
        match self.tx.lock().take() {
            Some(tx) => tx.send(verdict).is_ok(),
            None => false,
        }
    }
}

/// OTLP metrics export handler.
#[derive(Clone)]
pub struct MetricsService {
    checker: Checker,
    stats: Arc<ExportStats>,
    one_shot: Option<VerdictSink>,
    shutdown_rx: Option<watch::Receiver<bool>>,
}

impl MetricsService {
    /// Create a service in plain service mode.
    pub fn new(checker: Checker) -> Self {
        Self {
            checker,
            stats: Arc::new(ExportStats::new()),
            one_shot: None,
            shutdown_rx: None,
        }
    }

    /// Report the first verdict to `sink`.
    pub fn with_one_shot(mut self, sink: VerdictSink) -> Self {
        self.one_shot = Some(sink);
        self
    }

    /// Stop traversals early once `shutdown_rx` reads true.
    pub fn with_shutdown(mut self, shutdown_rx: watch::Receiver<bool>) -> Self {
        self.shutdown_rx = Some(shutdown_rx);
        self
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Counters shared by every clone of this service.
    pub fn stats(&self) -> Arc<ExportStats> {
        Arc::clone(&self.stats)
    }

    /// Handle one export call.
    pub fn export(
        &self,
        request: Option<&ExportMetricsServiceRequest>,
    ) -> CheckerResult<RenderedResponse> {
        let Some(request) = request else {
            return Ok(Verdict::default().render());
        };

        let report = self
            .checker
            .check_until(Some(request), self.shutdown_rx.as_ref());
        report.emit();

        if report.cancelled {
            self.stats.record_failure();
            return Err(CheckerError::Cancelled);
        }
        self.stats.record_check(report.verdict.violation_count);

        tracing::debug!(
            resources = request.resource_metrics.len(),
            violations = report.verdict.violation_count,
            "export checked"
        );

        if let Some(ref sink) = self.one_shot {
            if !sink.offer(report.verdict.clone()) {
                tracing::debug!("one-shot verdict already taken; ignoring this call");
            }
        }

        Ok(report.verdict.render())
    }
}

/// Decode an export request from raw protobuf or a single gRPC frame.
pub fn decode_export_payload(payload: &[u8]) -> CheckerResult<ExportMetricsServiceRequest> {
    let body = match payload {
        [0, a, b, c, d, rest @ ..] if u32::from_be_bytes([*a, *b, *c, *d]) as usize == rest.len() => {
            rest
        }
        _ => payload,
    };
    ExportMetricsServiceRequest::decode(body).map_err(|e| CheckerError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::otlp::proto::{Metric, ResourceMetrics, ScopeMetrics};
    use crate::engine::match_table::{CompiledRules, MatchTable, ResourceSchema};

    fn service() -> MetricsService {
        MetricsService::new(Checker::new(CompiledRules {
            resource: ResourceSchema::default(),
            metrics: MatchTable::default(),
            report_unmatched: false,
        }))
    }

    #[test]
    fn test_absent_request_accepts() {
        let rendered = service().export(None).unwrap();
        assert!(rendered.rejection.is_none());
        assert!(rendered.response.partial_success.is_none());
    }

    #[test]
    fn test_one_shot_first_call_wins() {
        let (sink, mut rx) = VerdictSink::channel();
        let svc = service().with_one_shot(sink.clone());
        let req = ExportMetricsServiceRequest::default();

        svc.export(Some(&req)).unwrap();
        svc.export(Some(&req)).unwrap();

        assert_eq!(rx.try_recv().unwrap(), Verdict::default());
        assert!(!sink.offer(Verdict::for_match("late", 1)));
        assert_eq!(svc.stats().snapshot().exports, 2);
    }

    #[test]
    fn test_decode_raw_and_framed() {
        let req = ExportMetricsServiceRequest {
            resource_metrics: vec![ResourceMetrics {
                scope_metrics: vec![ScopeMetrics {
                    metrics: vec![Metric::gauge("queue.depth", vec![])],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };
        let raw = req.encode_to_vec();
        assert_eq!(decode_export_payload(&raw).unwrap(), req);

        let mut framed = vec![0u8];
        framed.extend_from_slice(&(raw.len() as u32).to_be_bytes());
        framed.extend_from_slice(&raw);
        assert_eq!(decode_export_payload(&framed).unwrap(), req);

        assert!(matches!(
            decode_export_payload(&[0x0a, 0xff]),
            Err(CheckerError::Decode { .. })
        ));
    }
}
