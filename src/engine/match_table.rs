//! Compiled match rules.
//!
//! Built once at startup from configuration and the catalog; read-only
//! afterwards and shared across concurrent export calls behind an `Arc`.

use crate::core::config::{Config, MetricRuleConfig, ResourceRuleConfig};
use crate::core::error::{CheckerError, CheckerResult};
use crate::semconv::catalog::SchemaCatalog;
use crate::semconv::compare::AttributeSet;
use regex::Regex;

/// One compiled metric rule.
#[derive(Debug, Clone)]
pub struct MatchRule {
    /// Name matcher.
    pub pattern: Regex,
    /// Union of all referenced groups.
    pub required: AttributeSet,
    /// Keys never reported.
    pub ignore: AttributeSet,
}

impl MatchRule {
    /// Compile a single rule. `position` names the rule in error messages.
    pub fn compile(
        rule: &MetricRuleConfig,
        catalog: &dyn SchemaCatalog,
        position: usize,
    ) -> CheckerResult<Self> {
        let pattern = Regex::new(&rule.pattern).map_err(|source| CheckerError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        let required = catalog.attributes_for(&rule.groups, &format!("metrics[{}]", position))?;

        Ok(Self {
            pattern,
            required,
            ignore: AttributeSet::from_keys(&rule.ignore),
        })
    }

    /// Whether this rule applies to a metric name.
    pub fn matches(&self, metric_name: &str) -> bool {
        self.pattern.is_match(metric_name)
    }
}

/// Ordered rule list.
#[derive(Debug, Clone, Default)]
pub struct MatchTable {
    rules: Vec<MatchRule>,
}

impl MatchTable {
    /// Compile rules in declaration order; the first bad rule aborts.
    pub fn build(rules: &[MetricRuleConfig], catalog: &dyn SchemaCatalog) -> CheckerResult<Self> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| MatchRule::compile(rule, catalog, idx))
            .collect::<CheckerResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Table over already-compiled rules.
    pub fn from_rules(rules: Vec<MatchRule>) -> Self {
        Self { rules }
    }

    /// Every rule whose pattern matches, in declaration order.
    pub fn matching<'a>(&'a self, metric_name: &'a str) -> impl Iterator<Item = &'a MatchRule> {
        self.rules.iter().filter(move |rule| rule.matches(metric_name))
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Fixed requirements applied to every resource.
#[derive(Debug, Clone, Default)]
pub struct ResourceSchema {
    pub required: AttributeSet,
    pub ignore: AttributeSet,
    /// Schema URL resources and scopes should declare.
    pub expected_version: String,
}

impl ResourceSchema {
    /// Resolve the resource rule against the catalog.
    pub fn build(rule: &ResourceRuleConfig, catalog: &dyn SchemaCatalog) -> CheckerResult<Self> {
        Ok(Self {
            required: catalog.attributes_for(&rule.groups, "resource")?,
            ignore: AttributeSet::from_keys(&rule.ignore),
            expected_version: catalog.version().to_string(),
        })
    }
}

/// Everything the traversal needs, compiled from one configuration.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub resource: ResourceSchema,
    pub metrics: MatchTable,
    pub report_unmatched: bool,
}

impl CompiledRules {
    /// Compile resource and metric rules. Any error here must keep the
    /// service from starting.
    pub fn compile(config: &Config, catalog: &dyn SchemaCatalog) -> CheckerResult<Self> {
        let resource = ResourceSchema::build(&config.resource, catalog)?;
        let metrics = MatchTable::build(&config.metrics, catalog)?;
        tracing::debug!(
            rules = metrics.len(),
            resource_attributes = resource.required.len(),
            expected_version = %resource.expected_version,
            "compiled match table"
        );
        Ok(Self {
            resource,
            metrics,
            report_unmatched: config.server.report_unmatched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semconv::catalog::{GroupCatalog, GroupDef};

    fn catalog() -> GroupCatalog {
        GroupCatalog::from_groups(
            "https://opentelemetry.io/schemas/1.24.0",
            vec![
                GroupDef {
                    id: "http".to_string(),
                    brief: None,
                    extends: None,
                    attributes: vec!["http.method".into(), "http.status_code".into()],
                },
                GroupDef {
                    id: "net".to_string(),
                    brief: None,
                    extends: None,
                    attributes: vec!["net.peer.name".into(), "http.method".into()],
                },
            ],
        )
        .unwrap()
    }

    fn rule(pattern: &str, groups: &[&str]) -> MetricRuleConfig {
        MetricRuleConfig {
            pattern: pattern.to_string(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
            ignore: vec![],
        }
    }

    #[test]
    fn merges_groups_without_duplicates() {
        let table = MatchTable::build(&[rule("^http\\.", &["http", "net"])], &catalog()).unwrap();
        let required: Vec<_> = table.rules()[0].required.iter().collect();
        assert_eq!(required, vec!["http.method", "http.status_code", "net.peer.name"]);
    }

    #[test]
    fn all_matching_rules_apply_in_order() {
        let table = MatchTable::build(
            &[rule("^http\\.", &["http"]), rule("duration$", &["net"]), rule("^db\\.", &[])],
            &catalog(),
        )
        .unwrap();
        let hits: Vec<_> = table
            .matching("http.server.duration")
            .map(|r| r.pattern.as_str().to_string())
            .collect();
        assert_eq!(hits, vec!["^http\\.", "duration$"]);
        assert_eq!(table.matching("rpc.calls").count(), 0);
    }

    #[test]
    fn bad_pattern_is_fatal() {
        let err = MatchTable::build(&[rule("([", &["http"])], &catalog()).unwrap_err();
        assert!(matches!(err, CheckerError::InvalidPattern { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn unknown_group_is_fatal() {
        let err = MatchTable::build(&[rule(".*", &["http", "rpc"])], &catalog()).unwrap_err();
        match err {
            CheckerError::UnknownGroup {
                group,
                referenced_by,
            } => {
                assert_eq!(group, "rpc");
                assert_eq!(referenced_by, "metrics[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resource_schema_takes_catalog_version() {
        let schema = ResourceSchema::build(
            &ResourceRuleConfig {
                groups: vec!["net".into()],
                ignore: vec!["http.method".into()],
            },
            &catalog(),
        )
        .unwrap();
        assert_eq!(schema.expected_version, "https://opentelemetry.io/schemas/1.24.0");
        assert_eq!(schema.required.len(), 2);
        assert!(schema.ignore.contains("http.method"));
    }
}
