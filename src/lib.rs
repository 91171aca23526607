//! semconv-checker - OTLP metrics receiver that validates semantic conventions.
//!
//! The checker poses as an OTLP/gRPC metrics endpoint. Every export call is
//! walked resource by resource, scope by scope and metric by metric; each
//! metric whose name matches a configured rule is compared against the
//! attribute groups of a semantic convention catalog. Findings are logged,
//! missing attributes are counted, and the caller receives either an
//! accepting response or a partial-success rejection.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        OTLP/gRPC Export          │     check <file>      │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────────────────────────────────────────────────┐
//! │                 MetricsService (adapter)                 │
//! │        decode │ check │ emit events │ render response    │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Compliance engine                     │
//! │     MatchTable │ traversal fold │ Verdict │ CheckEvent   │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Semantic conventions                    │
//! │          GroupCatalog │ AttributeSet │ compare           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::config`] - Configuration parsing and validation
//! - [`core::runtime`] - Runtime orchestration
//! - [`core::error`] - Error types and mapping
//!
//! ## Semantic conventions
//! - [`semconv::catalog`] - Group catalog
//! - [`semconv::compare`] - Attribute set comparison
//!
//! ## Engine
//! - [`engine::match_table`] - Rule compilation
//! - [`engine::traversal`] - Compliance traversal
//! - [`engine::events`] - Log events
//! - [`engine::verdict`] - Aggregation and response shaping
//!
//! ## Adapters
//! - [`adapters::otlp`] - OTLP metrics over gRPC
//!
//! ## Operations
//! - [`ops::telemetry`] - Logging setup and counters
//!
//! ## CLI
//! - [`cli::commands`] - CLI command implementations
//!
//! # Key Invariants
//!
//! - Extra attributes and version mismatches are logged, never counted.
//! - Resource-level findings are logged, never counted.
//! - Every matching rule is applied, in declaration order.
//! - One check shares no mutable state with any other.

// Core infrastructure
pub mod core;

// Semantic convention data
pub mod semconv;

// Compliance engine
pub mod engine;

// Protocol adapters
pub mod adapters;

// Operations
pub mod ops;

// CLI
pub mod cli;

pub use crate::core::config::Config;
pub use crate::core::error::{CheckerError, CheckerResult};
pub use crate::core::runtime::{RunOutcome, Runtime};
pub use crate::engine::{CheckReport, Checker, ExitStatus, Verdict};
pub use crate::semconv::{GroupCatalog, SchemaCatalog};
