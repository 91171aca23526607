//! Error types and gRPC status mapping.
//!
//! Configuration problems (bad patterns, unknown groups, catalog cycles) are
//! fatal at startup. Malformed telemetry never produces one of these errors
//! on the checking path; only transport-level decode failures and
//! cancellation reach a caller as `CheckerError`.

use thiserror::Error;

/// Common checker error conditions.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// A `[[metrics]]` match pattern failed to compile.
    #[error("invalid match pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A configured rule references a group the catalog does not know.
    #[error("unknown semantic convention group {group:?} referenced by {referenced_by}")]
    UnknownGroup {
        group: String,
        referenced_by: String,
    },

    /// Group `extends` chain loops back on itself.
    #[error("semantic convention group {group:?} extends itself via {chain}")]
    CatalogCycle { group: String, chain: String },

    /// Configuration is structurally invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Export payload could not be decoded.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Request framing is malformed.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Method or encoding the endpoint does not serve.
    #[error("unsupported: {message}")]
    Unsupported { message: String },

    /// Declared message length is over the receive limit.
    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge { size: usize, limit: usize },

    /// Traversal stopped because shutdown was requested.
    #[error("check cancelled")]
    Cancelled,

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CheckerError {
    /// Create an UnknownGroup error.
    pub fn unknown_group(group: impl Into<String>, referenced_by: impl Into<String>) -> Self {
        Self::UnknownGroup {
            group: group.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error must stop the process from serving.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::UnknownGroup { .. }
                | Self::CatalogCycle { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// gRPC status code this error is reported with.
    pub fn grpc_code(&self) -> GrpcCode {
        match self {
            Self::Decode { .. } | Self::InvalidRequest { .. } => GrpcCode::InvalidArgument,
            Self::Unsupported { .. } => GrpcCode::Unimplemented,
            Self::MessageTooLarge { .. } => GrpcCode::ResourceExhausted,
            Self::Cancelled => GrpcCode::Cancelled,
            _ => GrpcCode::Internal,
        }
    }
}

/// Result type using CheckerError.
pub type CheckerResult<T> = Result<T, CheckerError>;

/// gRPC status codes used by the OTLP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrpcCode {
    Ok = 0,
    Cancelled = 1,
    InvalidArgument = 3,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Unimplemented = 12,
    Internal = 13,
}
