//! Core infrastructure tests.

mod common;

use common::{Fixture, CATALOG};
use semconv_checker::core::config::{Config, ConfigOverrides};
use semconv_checker::core::error::{CheckerError, GrpcCode};
use semconv_checker::core::runtime::{ComponentHealth, Runtime, RuntimeHealth};
use semconv_checker::semconv::catalog::{GroupCatalog, SchemaCatalog};

// ============================================================================
// Config tests
// ============================================================================

#[test]
fn parse_config_with_relative_catalog() {
    let fixture = Fixture::standard();
    let config = Config::from_file(&fixture.config_path).unwrap();

    assert_eq!(config.server.bind, "127.0.0.1:0");
    assert_eq!(config.metrics.len(), 1);
    assert_eq!(config.metrics[0].pattern, "^http\\..*");
    assert_eq!(
        std::path::Path::new(&config.catalog.path),
        fixture.dir.path().join("semconv.toml")
    );
}

#[test]
fn validate_rejects_bad_log_level() {
    let file = common::create_temp_file(
        r#"
[telemetry]
log_level = "loud"
"#,
    );
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("log_level"));
}

#[test]
fn validate_rejects_bad_bind() {
    let err = Config::from_toml(
        r#"
[server]
bind = "not-an-address"
"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("server.bind"));
}

#[test]
fn validate_rejects_empty_match() {
    let err = Config::from_toml(
        r#"
[[metrics]]
match = ""
groups = []
"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("metrics[0].match"));
}

#[test]
fn config_overrides_apply() {
    let mut config = Config::from_toml("").unwrap();
    let overrides = ConfigOverrides {
        log_level: Some("debug".to_string()),
        bind: Some("0.0.0.0:4317".to_string()),
        one_shot: true,
        ..Default::default()
    };

    config.apply_overrides(&overrides);
    assert_eq!(config.telemetry.log_level, "debug");
    assert_eq!(config.server.bind, "0.0.0.0:4317");
    assert!(config.server.one_shot);
    assert!(!config.server.report_unmatched);
}

// ============================================================================
// Catalog tests
// ============================================================================

#[test]
fn catalog_resolves_extends() {
    let catalog = GroupCatalog::from_toml(CATALOG).unwrap();
    let server = catalog.group("attributes.http.server").unwrap();
    assert_eq!(
        server.iter().collect::<Vec<_>>(),
        vec!["http.method", "http.status_code", "http.route"]
    );
    assert_eq!(catalog.len(), 4);
}

#[test]
fn catalog_cycle_is_fatal() {
    let err = GroupCatalog::from_toml(
        r#"
[[groups]]
id = "a"
extends = "b"

[[groups]]
id = "b"
extends = "a"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, CheckerError::CatalogCycle { .. }));
    assert!(err.is_fatal());
}

#[test]
fn catalog_unknown_parent_is_fatal() {
    let err = GroupCatalog::from_toml(
        r#"
[[groups]]
id = "a"
extends = "missing"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, CheckerError::UnknownGroup { ref group, .. } if group == "missing"));
}

// ============================================================================
// Error tests
// ============================================================================

#[test]
fn error_codes_are_stable() {
    assert_eq!(GrpcCode::FailedPrecondition as i32, 9);
    assert_eq!(GrpcCode::InvalidArgument as i32, 3);
    assert_eq!(CheckerError::Cancelled.grpc_code(), GrpcCode::Cancelled);
    assert_eq!(
        CheckerError::Decode {
            message: "eof".into()
        }
        .grpc_code(),
        GrpcCode::InvalidArgument
    );
    assert!(!CheckerError::Cancelled.is_fatal());
}

// ============================================================================
// Runtime tests
// ============================================================================

#[test]
fn runtime_health_default_is_starting() {
    let health = RuntimeHealth::default();
    assert_eq!(health.rules, ComponentHealth::Starting);
    assert_eq!(health.listener, ComponentHealth::Starting);
    assert!(!health.is_ready());
}

#[test]
fn runtime_loads_catalog_from_config() {
    let fixture = Fixture::standard();
    let config = Config::from_file(&fixture.config_path).unwrap();
    let runtime = Runtime::new(config).unwrap();

    assert_eq!(runtime.health().rules, ComponentHealth::Healthy);
    assert_eq!(runtime.service().checker().rules().metrics.len(), 1);
    assert_eq!(runtime.stats().exports, 0);
}

#[test]
fn runtime_refuses_invalid_pattern() {
    let fixture = Fixture::new(
        r#"
[catalog]
path = "semconv.toml"

[[metrics]]
match = "http.("
groups = ["attributes.http.common"]
"#,
        CATALOG,
    );
    let config = Config::from_file(&fixture.config_path).unwrap();
    let err = Runtime::new(config).err().unwrap();
    assert!(format!("{:#}", err).contains("http.("));
}

#[tokio::test]
async fn one_shot_runtime_exits_after_first_export() {
    use semconv_checker::core::runtime::RunOutcome;

    let fixture = Fixture::standard();
    let mut config = Config::from_file(&fixture.config_path).unwrap();
    config.server.one_shot = true;
    let mut runtime = Runtime::new(config).unwrap();

    let service = runtime.service().clone();
    let run = tokio::spawn(async move { runtime.run().await });

    let request = common::single_scope(
        &["service.name"],
        "io.http",
        vec![semconv_checker::adapters::otlp::proto::Metric::gauge(
            "http.server.duration",
            vec![common::point(&["http.method"])],
        )],
    );
    service.export(Some(&request)).unwrap();

    let outcome = run.await.unwrap().unwrap();
    match outcome {
        RunOutcome::OneShot(verdict) => {
            assert_eq!(verdict.violation_count, 1);
            assert_eq!(verdict.exit_status().code(), 100);
        }
        RunOutcome::Stopped => panic!("expected a one-shot verdict"),
    }
}

fn config_bound_to(addr: std::net::SocketAddr, one_shot: bool) -> Fixture {
    let config = common::CONFIG.replace(
        "bind = \"127.0.0.1:0\"",
        &format!("bind = \"{}\"\none_shot = {}", addr, one_shot),
    );
    Fixture::new(&config, CATALOG)
}

#[tokio::test]
async fn runtime_reports_listener_bind_failure() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let fixture = config_bound_to(taken.local_addr().unwrap(), false);
    let config = Config::from_file(&fixture.config_path).unwrap();
    let mut runtime = Runtime::new(config).unwrap();

    let err = runtime.run().await.unwrap_err();
    assert!(format!("{:#}", err).contains("OTLP listener failed"));
    assert_eq!(runtime.health().listener, ComponentHealth::Failed);
}

#[tokio::test]
async fn one_shot_start_without_listener_is_not_clean() {
    use semconv_checker::cli::commands::{run_start, StartArgs};

    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let fixture = config_bound_to(taken.local_addr().unwrap(), true);

    let result = run_start(&fixture.config_path, None, StartArgs::default()).await;
    assert!(result.is_err(), "expected an error, got {:?}", result.ok());
}

#[test]
fn max_message_bytes_must_be_positive() {
    let err = Config::from_toml(
        r#"
[server]
max_message_bytes = 0
"#,
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("max_message_bytes"));
}
