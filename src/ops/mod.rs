//! Operations and observability.
//!
//! - [`telemetry`] - Subscriber setup and export counters

pub mod telemetry;
