//! Compliance engine tests.

mod common;

use common::{checker, point, single_scope, standard_checker, CATALOG, VERSION};
use semconv_checker::adapters::otlp::proto::{
    ExportMetricsServiceRequest, Metric, MetricData, ResourceMetrics, ScopeMetrics,
};
use semconv_checker::engine::events::{CheckEvent, Section};
use semconv_checker::engine::verdict::{ExitStatus, Verdict, EXIT_VIOLATIONS};

fn metric_events(events: &[CheckEvent]) -> Vec<&CheckEvent> {
    events
        .iter()
        .filter(|e| e.section() == Section::Metric)
        .collect()
}

// ============================================================================
// Metric comparison
// ============================================================================

#[test]
fn missing_status_code_is_reported() {
    let req = single_scope(
        &["service.name"],
        "io.http",
        vec![Metric::gauge("http.server.duration", vec![point(&["http.method"])])],
    );
    let report = standard_checker().check(Some(&req));

    assert_eq!(report.verdict.violation_count, 1);
    assert_eq!(
        report.events,
        vec![CheckEvent::Attributes {
            section: Section::Metric,
            version: VERSION.to_string(),
            scope: Some("io.http".to_string()),
            metric: Some("http.server.duration".to_string()),
            missing: vec!["http.status_code".to_string()],
            extra: vec![],
        }]
    );
}

#[test]
fn extra_attributes_never_reject() {
    let req = single_scope(
        &["service.name"],
        "io.http",
        vec![Metric::sum(
            "http.server.requests",
            vec![point(&["http.method", "http.status_code", "net.peer.name"])],
        )],
    );
    let report = standard_checker().check(Some(&req));

    assert!(report.verdict.is_clean());
    assert!(report.verdict.render().rejection.is_none());
    match &report.events[..] {
        [CheckEvent::Attributes { missing, extra, .. }] => {
            assert!(missing.is_empty());
            assert_eq!(extra, &vec!["net.peer.name".to_string()]);
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[test]
fn every_matching_rule_is_applied() {
    let config = r#"
[[metrics]]
match = "^http\\..*"
groups = ["attributes.http.common"]

[[metrics]]
match = "duration$"
groups = ["attributes.db"]
"#;
    let req = single_scope(
        &["service.name"],
        "io.http",
        vec![Metric::gauge(
            "http.server.duration",
            vec![point(&["http.method", "http.status_code"])],
        )],
    );
    let report = checker(config, CATALOG).check(Some(&req));

    assert_eq!(report.verdict.violation_count, 1);
    assert_eq!(report.verdict.implicated_scopes, vec!["io.http", "io.http"]);
    assert_eq!(metric_events(&report.events).len(), 1);
}

#[test]
fn ignore_list_suppresses_keys() {
    let config = r#"
[[metrics]]
match = "^http\\..*"
groups = ["attributes.http.common"]
ignore = ["http.status_code", "debug.id"]
"#;
    let req = single_scope(
        &[],
        "io.http",
        vec![Metric::gauge(
            "http.client.duration",
            vec![point(&["http.method", "debug.id"])],
        )],
    );
    let report = checker(config, CATALOG).check(Some(&req));

    assert!(report.verdict.is_clean());
    assert!(report.events.is_empty());
}

#[test]
fn absent_scope_is_recorded_as_empty_name() {
    let mut req = single_scope(
        &["service.name"],
        "",
        vec![Metric::gauge("http.server.duration", vec![point(&[])])],
    );
    req.resource_metrics[0].scope_metrics[0].scope = None;
    let report = standard_checker().check(Some(&req));

    assert_eq!(report.verdict.violation_count, 2);
    assert_eq!(report.verdict.implicated_scopes, vec![""]);
}

// ============================================================================
// Unsupported and unmatched metrics
// ============================================================================

#[test]
fn histogram_yields_one_warning_and_no_count() {
    let req = single_scope(
        &["service.name"],
        "io.http",
        vec![Metric {
            name: "http.server.duration".to_string(),
            data: Some(MetricData::Histogram(vec![])),
            ..Default::default()
        }],
    );
    let report = standard_checker().check(Some(&req));

    assert_eq!(
        report.events,
        vec![CheckEvent::UnsupportedMetric {
            scope: "io.http".to_string(),
            metric: "http.server.duration".to_string(),
            kind: "histogram".to_string(),
        }]
    );
    assert_eq!(report.verdict, Verdict::default());
}

#[test]
fn unmatched_metrics_reported_only_when_enabled() {
    let req = single_scope(
        &["service.name"],
        "io.db",
        vec![Metric::gauge("db.client.connections", vec![point(&[])])],
    );

    let quiet = standard_checker().check(Some(&req));
    assert!(quiet.events.is_empty());

    let config = format!("{}\n", common::CONFIG).replace("[server]", "[server]\nreport_unmatched = true");
    let loud = checker(&config, CATALOG).check(Some(&req));
    assert_eq!(
        loud.events,
        vec![CheckEvent::UnmatchedMetric {
            scope: "io.db".to_string(),
            metric: "db.client.connections".to_string(),
        }]
    );
    assert!(loud.verdict.is_clean());
}

// ============================================================================
// Resource checks
// ============================================================================

#[test]
fn resource_version_mismatch_is_logged_once_and_not_counted() {
    let mut req = single_scope(&["service.name"], "io.http", vec![]);
    req.resource_metrics[0].schema_url = "https://opentelemetry.io/schemas/1.20.0".to_string();
    let report = standard_checker().check(Some(&req));

    let mismatches: Vec<_> = report
        .events
        .iter()
        .filter(|e| matches!(e, CheckEvent::VersionMismatch { .. }))
        .collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].section(), Section::Resource);
    assert_eq!(report.verdict.violation_count, 0);
}

#[test]
fn scope_version_mismatch_is_tagged_metric() {
    let mut req = single_scope(&["service.name"], "io.http", vec![]);
    req.resource_metrics[0].scope_metrics[0].schema_url = String::new();
    let report = standard_checker().check(Some(&req));

    assert_eq!(
        report.events,
        vec![CheckEvent::VersionMismatch {
            section: Section::Metric,
            scope: Some("io.http".to_string()),
            version: String::new(),
            expected: VERSION.to_string(),
        }]
    );
}

#[test]
fn missing_resource_attributes_are_advisory() {
    let req = single_scope(&["host.name"], "io.http", vec![]);
    let report = standard_checker().check(Some(&req));

    assert!(report.verdict.is_clean());
    assert_eq!(
        report.events,
        vec![CheckEvent::Attributes {
            section: Section::Resource,
            version: VERSION.to_string(),
            scope: None,
            metric: None,
            missing: vec!["service.name".to_string()],
            extra: vec!["host.name".to_string()],
        }]
    );
}

// ============================================================================
// Verdict
// ============================================================================

#[test]
fn zero_resources_accepts() {
    let report = standard_checker().check(Some(&ExportMetricsServiceRequest::default()));
    let rendered = report.verdict.render();

    assert!(rendered.rejection.is_none());
    assert!(rendered.response.partial_success.is_none());
    assert_eq!(report.verdict.exit_status(), ExitStatus::Clean);
}

#[test]
fn violations_map_to_exit_code() {
    let req = single_scope(
        &["service.name"],
        "io.http",
        vec![Metric::gauge("http.server.duration", vec![point(&[])])],
    );
    let verdict = standard_checker().check(Some(&req)).verdict;

    assert_eq!(verdict.exit_status(), ExitStatus::ViolationsFound);
    assert_eq!(verdict.exit_status().code(), EXIT_VIOLATIONS);
}

#[test]
fn results_fold_across_resources() {
    let one = single_scope(
        &["service.name"],
        "io.a",
        vec![Metric::gauge("http.a", vec![point(&["http.method"])])],
    );
    let two = single_scope(
        &["service.name"],
        "io.b",
        vec![Metric::gauge("http.b", vec![point(&[])])],
    );
    let req = ExportMetricsServiceRequest {
        resource_metrics: one
            .resource_metrics
            .into_iter()
            .chain(two.resource_metrics)
            .chain(std::iter::once(ResourceMetrics {
                scope_metrics: vec![ScopeMetrics::default()],
                schema_url: VERSION.to_string(),
                ..Default::default()
            }))
            .collect(),
    };
    let checker = standard_checker();
    let first = checker.check(Some(&req));
    let second = checker.check(Some(&req));

    assert_eq!(first.verdict.violation_count, 3);
    assert_eq!(first.verdict.implicated_scopes, vec!["io.a", "io.b"]);
    assert_eq!(first, second);
}
