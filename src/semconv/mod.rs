//! Semantic convention schema data.
//!
//! - [`catalog`] - group catalog and expected schema version
//! - [`compare`] - attribute key sets and the comparator

pub mod catalog;
pub mod compare;

pub use catalog::{GroupCatalog, GroupDef, SchemaCatalog, DEFAULT_SCHEMA_VERSION};
pub use compare::{compare, AttributeSet, ComparisonResult};
