//! Core runtime infrastructure.
//!
//! - [`config`] - Configuration parsing and validation
//! - [`runtime`] - Startup ordering, listener lifecycle, one-shot outcome
//! - [`error`] - Error types and gRPC status mapping

pub mod config;
pub mod error;
pub mod runtime;
