//! OTLP metrics adapter.
//!
//! Exposes an OTLP/gRPC `MetricsService` that validates every export call
//! instead of storing it.
//!
//! # Modules
//!
//! - [`proto`] - OTLP metrics wire types
//! - [`service`] - export handling, one-shot verdict hand-off
//! - [`grpc`] - tonic service wrapper and server

#[cfg(feature = "grpc")]
pub mod grpc;
pub mod proto;
pub mod service;

#[cfg(feature = "grpc")]
pub use grpc::{MetricsGrpcServer, OtlpMetricsServer, EXPORT_PATH};
pub use proto::{
    AnyValue, AnyValueKind, ExportMetricsPartialSuccess, ExportMetricsServiceRequest,
    ExportMetricsServiceResponse, Gauge, InstrumentationScope, KeyValue, Metric, MetricData,
    NumberDataPoint, NumberValue, Resource, ResourceMetrics, ScopeMetrics, Sum,
};
pub use service::{decode_export_payload, MetricsService, VerdictSink};
