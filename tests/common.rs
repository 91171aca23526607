//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use semconv_checker::adapters::otlp::proto::{
    ExportMetricsServiceRequest, InstrumentationScope, KeyValue, Metric, NumberDataPoint,
    Resource, ResourceMetrics, ScopeMetrics,
};
use semconv_checker::core::config::Config;
use semconv_checker::engine::match_table::CompiledRules;
use semconv_checker::engine::traversal::Checker;
use semconv_checker::semconv::catalog::GroupCatalog;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

/// Expected schema URL of [`CATALOG`].
pub const VERSION: &str = "https://opentelemetry.io/schemas/1.24.0";

/// Small catalog with one extension chain.
pub const CATALOG: &str = r#"
version = "https://opentelemetry.io/schemas/1.24.0"

[[groups]]
id = "resource.service"
brief = "A service instance."
attributes = ["service.name"]

[[groups]]
id = "attributes.http.common"
attributes = ["http.method", "http.status_code"]

[[groups]]
id = "attributes.http.server"
extends = "attributes.http.common"
attributes = ["http.route"]

[[groups]]
id = "attributes.db"
attributes = ["db.system"]
"#;

/// Config referencing [`CATALOG`] by relative path.
pub const CONFIG: &str = r#"
[server]
bind = "127.0.0.1:0"

[catalog]
path = "semconv.toml"

[resource]
groups = ["resource.service"]

[[metrics]]
match = "^http\\..*"
groups = ["attributes.http.common"]
"#;

/// A config file and its catalog side by side in a temp directory.
pub struct Fixture {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl Fixture {
    pub fn new(config: &str, catalog: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("semconv.toml"), catalog).expect("Failed to write catalog");
        let config_path = dir.path().join("checker.toml");
        std::fs::write(&config_path, config).expect("Failed to write config");
        Self { dir, config_path }
    }

    pub fn standard() -> Self {
        Self::new(CONFIG, CATALOG)
    }
}

/// Write arbitrary content to a temp file.
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Compile a checker from inline config and catalog text.
pub fn checker(config: &str, catalog: &str) -> Checker {
    let config = Config::from_toml(config).expect("config parses");
    let catalog = GroupCatalog::from_toml(catalog).expect("catalog parses");
    Checker::new(CompiledRules::compile(&config, &catalog).expect("rules compile"))
}

/// Checker over [`CONFIG`] and [`CATALOG`].
pub fn standard_checker() -> Checker {
    checker(CONFIG, CATALOG)
}

/// Data point carrying the given attribute keys.
pub fn point(keys: &[&str]) -> NumberDataPoint {
    NumberDataPoint::with_attributes(keys.iter().map(|k| KeyValue::string(*k, "v")).collect())
}

/// One resource with one scope, all declared at [`VERSION`].
pub fn single_scope(
    resource_keys: &[&str],
    scope: &str,
    metrics: Vec<Metric>,
) -> ExportMetricsServiceRequest {
    ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            resource: Some(Resource {
                attributes: resource_keys
                    .iter()
                    .map(|k| KeyValue::string(*k, "v"))
                    .collect(),
                dropped_attributes_count: 0,
            }),
            scope_metrics: vec![ScopeMetrics {
                scope: Some(InstrumentationScope {
                    name: scope.to_string(),
                    ..Default::default()
                }),
                metrics,
                schema_url: VERSION.to_string(),
            }],
            schema_url: VERSION.to_string(),
        }],
    }
}
