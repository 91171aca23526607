//! Compliance traversal over an export batch.
//!
//! Resources, then scopes, then metrics, then data points. Every step
//! returns its own [`CheckReport`] and the caller folds them together, so
//! a check owns all of its state and concurrent checks never interact.

use crate::adapters::otlp::proto::{
    ExportMetricsServiceRequest, KeyValue, Metric, MetricData, NumberDataPoint, ResourceMetrics,
    ScopeMetrics,
};
use crate::engine::events::{CheckEvent, Section};
use crate::engine::match_table::{CompiledRules, MatchRule};
use crate::engine::verdict::{CheckReport, Verdict};
use crate::semconv::compare::{compare, AttributeSet, ComparisonResult};
use std::sync::Arc;
use tokio::sync::watch;

/// Attribute keys present on a list of key/value pairs.
fn keys_of(attributes: &[KeyValue]) -> AttributeSet {
    AttributeSet::from_keys(attributes.iter().map(|kv| kv.key.as_str()))
}

/// Metric payloads the comparator understands.
enum Shape<'a> {
    Number(&'a [NumberDataPoint]),
    Unsupported(&'static str),
}

impl<'a> Shape<'a> {
    fn of(metric: &'a Metric) -> Self {
        match &metric.data {
            Some(MetricData::Gauge(gauge)) => Shape::Number(&gauge.data_points),
            Some(MetricData::Sum(sum)) => Shape::Number(&sum.data_points),
            Some(
                data @ (MetricData::Histogram(_)
                | MetricData::ExponentialHistogram(_)
                | MetricData::Summary(_)),
            ) => Shape::Unsupported(data.kind()),
            None => Shape::Unsupported("empty"),
        }
    }
}

/// Runs compliance checks against compiled rules.
///
/// Cheap to clone; the rules are shared read-only.
#[derive(Debug, Clone)]
pub struct Checker {
    rules: Arc<CompiledRules>,
}

impl Checker {
    /// Create a checker over compiled rules.
    pub fn new(rules: CompiledRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Compiled rules in use.
    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    /// Check a whole export request. An absent request yields an empty report.
    pub fn check(&self, request: Option<&ExportMetricsServiceRequest>) -> CheckReport {
        self.check_until(request, None)
    }

    /// Like [`Checker::check`], stopping before the next resource once
    /// `shutdown` reads true.
    pub fn check_until(
        &self,
        request: Option<&ExportMetricsServiceRequest>,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> CheckReport {
        let Some(request) = request else {
            return CheckReport::default();
        };

        let mut report = CheckReport::default();
        for resource_metrics in &request.resource_metrics {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                tracing::debug!("check interrupted by shutdown");
                report.cancelled = true;
                break;
            }
            report = report.merge(self.check_resource(resource_metrics));
        }
        report
    }

    fn check_resource(&self, rm: &ResourceMetrics) -> CheckReport {
        let schema = &self.rules.resource;
        let mut events = Vec::new();

        if rm.schema_url != schema.expected_version {
            events.push(CheckEvent::VersionMismatch {
                section: Section::Resource,
                scope: None,
                version: rm.schema_url.clone(),
                expected: schema.expected_version.clone(),
            });
        }

        // Resource findings are logged but never counted.
        let observed = rm.resource.as_ref().map(|r| keys_of(&r.attributes));
        let result = compare(&schema.required, observed.as_ref(), &schema.ignore);
        if !result.is_empty() {
            events.push(CheckEvent::Attributes {
                section: Section::Resource,
                version: rm.schema_url.clone(),
                scope: None,
                metric: None,
                missing: result.missing,
                extra: result.extra,
            });
        }

        rm.scope_metrics
            .iter()
            .map(|sm| self.check_scope(sm))
            .fold(CheckReport::from_events(events), CheckReport::merge)
    }

    fn check_scope(&self, sm: &ScopeMetrics) -> CheckReport {
        let expected = &self.rules.resource.expected_version;
        let scope_name = sm.scope.as_ref().map(|s| s.name.as_str()).unwrap_or_default();

        let mut events = Vec::new();
        if &sm.schema_url != expected {
            events.push(CheckEvent::VersionMismatch {
                section: Section::Metric,
                scope: Some(scope_name.to_string()),
                version: sm.schema_url.clone(),
                expected: expected.clone(),
            });
        }

        sm.metrics
            .iter()
            .map(|metric| self.check_metric(scope_name, &sm.schema_url, metric))
            .fold(CheckReport::from_events(events), CheckReport::merge)
    }

    fn check_metric(&self, scope: &str, version: &str, metric: &Metric) -> CheckReport {
        let points = match Shape::of(metric) {
            Shape::Number(points) => points,
            Shape::Unsupported(kind) => {
                return CheckReport::from_events(vec![CheckEvent::UnsupportedMetric {
                    scope: scope.to_string(),
                    metric: metric.name.clone(),
                    kind: kind.to_string(),
                }]);
            }
        };

        let rules: Vec<&MatchRule> = self.rules.metrics.matching(&metric.name).collect();
        if rules.is_empty() {
            if !self.rules.report_unmatched {
                return CheckReport::default();
            }
            return CheckReport::from_events(vec![CheckEvent::UnmatchedMetric {
                scope: scope.to_string(),
                metric: metric.name.clone(),
            }]);
        }

        let observed: Vec<AttributeSet> = points.iter().map(|p| keys_of(&p.attributes)).collect();

        rules
            .into_iter()
            .map(|rule| {
                let result = check_points(rule, &observed);
                let verdict = Verdict::for_match(scope, result.missing.len());
                let events = if result.is_empty() {
                    Vec::new()
                } else {
                    vec![CheckEvent::Attributes {
                        section: Section::Metric,
                        version: version.to_string(),
                        scope: Some(scope.to_string()),
                        metric: Some(metric.name.clone()),
                        missing: result.missing,
                        extra: result.extra,
                    }]
                };
                CheckReport {
                    verdict,
                    events,
                    cancelled: false,
                }
            })
            .fold(CheckReport::default(), CheckReport::merge)
    }
}

/// Compare each data point against the rule, concatenating the results.
fn check_points(rule: &MatchRule, observed: &[AttributeSet]) -> ComparisonResult {
    observed
        .iter()
        .map(|point| compare(&rule.required, Some(point), &rule.ignore))
        .fold(ComparisonResult::default(), |mut acc, result| {
            acc.append(result);
            acc
        })
}
