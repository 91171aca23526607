//! Protocol adapters.
//!
//! - [`otlp`] - OTLP metrics over gRPC

pub mod otlp;
