//! Compliance engine.
//!
//! ```text
//! export request ──► Checker (traversal) ──► CheckReport { Verdict, events }
//!                        │                          │
//!                  CompiledRules             render() / exit_status()
//!            (MatchTable + ResourceSchema)
//! ```
//!
//! - [`match_table`] - rule compilation
//! - [`traversal`] - resource → scope → metric → data point walk
//! - [`events`] - log events and their emission
//! - [`verdict`] - aggregation and response shaping

pub mod events;
pub mod match_table;
pub mod traversal;
pub mod verdict;

pub use events::{CheckEvent, Section};
pub use match_table::{CompiledRules, MatchRule, MatchTable, ResourceSchema};
pub use traversal::Checker;
pub use verdict::{
    CheckReport, ExitStatus, Rejection, RenderedResponse, Verdict, EXIT_CLEAN, EXIT_VIOLATIONS,
};
