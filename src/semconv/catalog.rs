//! Semantic convention group catalog.
//!
//! The catalog maps group ids to their resolved attribute sets and carries
//! the one schema URL that resources and scopes are expected to declare.
//!
//! # File format
//!
//! ```toml
//! version = "https://opentelemetry.io/schemas/1.24.0"
//!
//! [[groups]]
//! id = "attributes.http.common"
//! attributes = ["http.request.method", "http.response.status_code"]
//!
//! [[groups]]
//! id = "attributes.http.server"
//! extends = "attributes.http.common"
//! attributes = ["url.scheme"]
//! ```

use crate::core::error::{CheckerError, CheckerResult};
use crate::semconv::compare::AttributeSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Schema URL assumed when a catalog file does not declare one.
pub const DEFAULT_SCHEMA_VERSION: &str = "https://opentelemetry.io/schemas/1.24.0";

/// Read-only source of semantic convention groups.
pub trait SchemaCatalog: Send + Sync {
    /// Resolved attribute set for a group id.
    fn group(&self, id: &str) -> Option<&AttributeSet>;

    /// Expected schema URL.
    fn version(&self) -> &str;

    /// Resolve and union several groups; any unknown id is an error.
    fn attributes_for(&self, ids: &[String], referenced_by: &str) -> CheckerResult<AttributeSet> {
        let mut merged = AttributeSet::new();
        for id in ids {
            let group = self
                .group(id)
                .ok_or_else(|| CheckerError::unknown_group(id.as_str(), referenced_by))?;
            merged.extend_from(group);
        }
        Ok(merged)
    }
}

/// One group as written in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    pub id: String,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    groups: Vec<GroupDef>,
}

/// Catalog loaded from a TOML file with `extends` chains flattened.
#[derive(Debug, Clone)]
pub struct GroupCatalog {
    version: String,
    groups: BTreeMap<String, AttributeSet>,
    briefs: HashMap<String, String>,
}

impl GroupCatalog {
    /// Load a catalog from a TOML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to load catalog: {}", path.display()))
    }

    /// Load a catalog from a TOML string.
    pub fn from_toml(content: &str) -> CheckerResult<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| CheckerError::invalid_config(e.to_string()))?;
        Self::from_groups(
            file.version
                .unwrap_or_else(|| DEFAULT_SCHEMA_VERSION.to_string()),
            file.groups,
        )
    }

    /// Build a catalog from group definitions.
    pub fn from_groups(version: impl Into<String>, defs: Vec<GroupDef>) -> CheckerResult<Self> {
        let mut by_id: HashMap<&str, &GroupDef> = HashMap::new();
        for def in &defs {
            if by_id.insert(def.id.as_str(), def).is_some() {
                return Err(CheckerError::invalid_config(format!(
                    "duplicate group id {:?}",
                    def.id
                )));
            }
        }

        let mut groups = BTreeMap::new();
        for def in &defs {
            let resolved = resolve(def, &by_id)?;
            groups.insert(def.id.clone(), resolved);
        }

        let briefs = defs
            .iter()
            .filter_map(|d| d.brief.clone().map(|b| (d.id.clone(), b)))
            .collect();

        Ok(Self {
            version: version.into(),
            groups,
            briefs,
        })
    }

    /// Group ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Short description of a group, if the file gave one.
    pub fn brief(&self, id: &str) -> Option<&str> {
        self.briefs.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl SchemaCatalog for GroupCatalog {
    fn group(&self, id: &str) -> Option<&AttributeSet> {
        self.groups.get(id)
    }

    fn version(&self) -> &str {
        &self.version
    }
}

/// Flatten a group's `extends` chain, parent attributes first.
fn resolve(def: &GroupDef, by_id: &HashMap<&str, &GroupDef>) -> CheckerResult<AttributeSet> {
    let mut chain: Vec<&GroupDef> = vec![def];
    let mut current = def;
    while let Some(parent_id) = current.extends.as_deref() {
        let parent = by_id
            .get(parent_id)
            .copied()
            .ok_or_else(|| CheckerError::unknown_group(parent_id, format!("group {}", def.id)))?;
        if chain.iter().any(|g| g.id == parent.id) {
            let path: Vec<&str> = chain.iter().map(|g| g.id.as_str()).collect();
            return Err(CheckerError::CatalogCycle {
                group: def.id.clone(),
                chain: format!("{} -> {}", path.join(" -> "), parent.id),
            });
        }
        chain.push(parent);
        current = parent;
    }

    let mut attributes = AttributeSet::new();
    for group in chain.iter().rev() {
        for key in &group.attributes {
            attributes.insert(key);
        }
    }
    Ok(attributes)
}
