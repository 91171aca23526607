//! gRPC server for the OTLP metrics export API.
//!
//! Serves `opentelemetry.proto.collector.metrics.v1.MetricsService/Export`
//! with hand-rolled framing over tonic's transport, using the proto module
//! for wire encoding. A rejected export still carries its partial-success
//! body; the failure status travels in the trailers.

use crate::core::error::{CheckerError, CheckerResult, GrpcCode};
use crate::engine::verdict::{Rejection, RenderedResponse};
use bytes::{BufMut, Bytes, BytesMut};
use http_body_util::BodyExt;
use prost::Message;
use std::net::SocketAddr;
use tokio::sync::watch;
use tonic::codegen::http::{header, StatusCode};
use tonic::{Code, Status};

use super::proto;
use super::service::MetricsService;

/// Full method path of the export RPC.
pub const EXPORT_PATH: &str = "/opentelemetry.proto.collector.metrics.v1.MetricsService/Export";

/// Default cap on a received message, matching tonic's generated servers.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Build a tonic Status from a checker status code.
pub fn grpc_status(code: GrpcCode, message: impl Into<String>) -> Status {
    let code = match code {
        GrpcCode::Ok => Code::Ok,
        GrpcCode::Cancelled => Code::Cancelled,
        GrpcCode::InvalidArgument => Code::InvalidArgument,
        GrpcCode::ResourceExhausted => Code::ResourceExhausted,
        GrpcCode::FailedPrecondition => Code::FailedPrecondition,
        GrpcCode::Unimplemented => Code::Unimplemented,
        GrpcCode::Internal => Code::Internal,
    };
    Status::new(code, message)
}

/// Convert a CheckerError to a tonic Status.
pub fn checker_error_to_status(e: CheckerError) -> Status {
    grpc_status(e.grpc_code(), e.to_string())
}

/// Convert a compliance rejection to a tonic Status.
pub fn rejection_to_status(rejection: &Rejection) -> Status {
    grpc_status(rejection.code, rejection.message.clone())
}

/// Declared payload length of a frame whose 5-byte header has arrived.
fn frame_len(data: &[u8]) -> Option<usize> {
    match data {
        [_, a, b, c, d, ..] => Some(u32::from_be_bytes([*a, *b, *c, *d]) as usize),
        _ => None,
    }
}

/// Decode gRPC message from body bytes (strips the 5-byte header).
fn decode_grpc_message<M: Message + Default>(body: &Bytes, limit: usize) -> CheckerResult<M> {
    let Some(len) = frame_len(body) else {
        return Err(CheckerError::InvalidRequest {
            message: "gRPC message too short".to_string(),
        });
    };

    if body[0] != 0 {
        return Err(CheckerError::Unsupported {
            message: "compressed gRPC messages".to_string(),
        });
    }
    if len > limit {
        return Err(CheckerError::MessageTooLarge { size: len, limit });
    }
    if body.len() < 5 + len {
        return Err(CheckerError::InvalidRequest {
            message: format!(
                "gRPC message truncated: expected {} bytes, got {}",
                len,
                body.len() - 5
            ),
        });
    }

    M::decode(&body[5..5 + len]).map_err(|e| CheckerError::Decode {
        message: e.to_string(),
    })
}

/// Encode gRPC message to bytes (adds the 5-byte header).
fn encode_grpc_message<M: Message>(msg: &M) -> Bytes {
    let encoded = msg.encode_to_vec();
    let len = encoded.len() as u32;

    let mut buf = BytesMut::with_capacity(5 + encoded.len());
    buf.put_u8(0); // not compressed
    buf.put_u32(len);
    buf.put_slice(&encoded);
    buf.freeze()
}

/// A unary gRPC body: one data frame, then trailers with the final status.
struct GrpcBody {
    data: Option<Bytes>,
    status: Option<Status>,
    trailers_sent: bool,
}

impl http_body::Body for GrpcBody {
    type Data = Bytes;
    type Error = Status;

    fn poll_frame(
        mut self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        if let Some(data) = self.data.take() {
            return std::task::Poll::Ready(Some(Ok(http_body::Frame::data(data))));
        }
        if !self.trailers_sent {
            self.trailers_sent = true;
            let status = self
                .status
                .take()
                .unwrap_or_else(|| grpc_status(GrpcCode::Ok, ""));
            let mut trailers = tonic::codegen::http::HeaderMap::new();
            if let Err(e) = status.add_header(&mut trailers) {
                return std::task::Poll::Ready(Some(Err(e)));
            }
            return std::task::Poll::Ready(Some(Ok(http_body::Frame::trailers(trailers))));
        }
        std::task::Poll::Ready(None)
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_none() && self.trailers_sent
    }
}

/// Build a gRPC response; `status` defaults to OK.
fn grpc_response(
    body: Bytes,
    status: Option<Status>,
) -> tonic::codegen::http::Response<tonic::body::BoxBody> {
    use tonic::body::BoxBody;

    let grpc_body = GrpcBody {
        data: Some(body),
        status,
        trailers_sent: false,
    };

    let mut response = tonic::codegen::http::Response::new(BoxBody::new(grpc_body));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/grpc"),
    );
    response
}

/// Build a gRPC error response.
fn grpc_error_response(status: Status) -> tonic::codegen::http::Response<tonic::body::BoxBody> {
    status.into_http()
}

/// Render an engine outcome as an HTTP response.
fn rendered_to_http(
    rendered: RenderedResponse,
) -> tonic::codegen::http::Response<tonic::body::BoxBody> {
    let status = rendered.rejection.as_ref().map(rejection_to_status);
    grpc_response(encode_grpc_message(&rendered.response), status)
}

/// gRPC server for the OTLP metrics service.
pub struct MetricsGrpcServer {
    /// Bind address.
    bind_addr: SocketAddr,
    /// Export handler.
    service: MetricsService,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Largest accepted request message.
    max_message_bytes: usize,
}

impl MetricsGrpcServer {
    /// Create a new gRPC server.
    pub fn new(
        bind_addr: SocketAddr,
        service: MetricsService,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            bind_addr,
            service,
            shutdown_rx,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Reject requests whose message is larger than `limit` bytes.
    pub fn with_max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Run the gRPC server until the shutdown signal fires.
    pub async fn run(self) -> CheckerResult<()> {
        use tonic::transport::Server;

        let addr = self.bind_addr;
        let mut shutdown_rx = self.shutdown_rx.clone();

        tracing::info!(%addr, "starting OTLP metrics gRPC server");

        Server::builder()
            .add_service(
                OtlpMetricsServer::new(self.service).with_max_message_bytes(self.max_message_bytes),
            )
            .serve_with_shutdown(addr, async move {
                while !*shutdown_rx.borrow() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                tracing::info!("gRPC server shutting down");
            })
            .await
            .map_err(|e| CheckerError::Internal {
                message: format!("gRPC server error: {}", e),
            })?;

        Ok(())
    }
}

// ============================================================================
// Tonic Service Wrapper
// ============================================================================

/// Wrapper to make MetricsService routable by tonic.
#[derive(Clone)]
pub struct OtlpMetricsServer {
    inner: MetricsService,
    max_message_bytes: usize,
}

impl OtlpMetricsServer {
    pub fn new(inner: MetricsService) -> Self {
        Self {
            inner,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Reject requests whose message is larger than `limit` bytes.
    pub fn with_max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }
}

impl tonic::server::NamedService for OtlpMetricsServer {
    const NAME: &'static str = "opentelemetry.proto.collector.metrics.v1.MetricsService";
}

impl<B> tonic::codegen::Service<tonic::codegen::http::Request<B>> for OtlpMetricsServer
where
    B: tonic::codegen::Body + Send + 'static,
    B::Data: Into<Bytes> + Send,
    B::Error: Into<tonic::codegen::StdError> + Send + 'static,
{
    type Response = tonic::codegen::http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: tonic::codegen::http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        let limit = self.max_message_bytes;
        let path = req.uri().path().to_string();

        Box::pin(async move {
            if path != EXPORT_PATH {
                tracing::warn!(path = %path, "unknown metrics service method");
                return Ok(grpc_error_response(checker_error_to_status(
                    CheckerError::Unsupported {
                        message: format!("method {}", path),
                    },
                )));
            }

            // Unary call: read until one complete frame or end of stream.
            let mut data = BytesMut::new();
            let mut pinned_body = std::pin::pin!(req.into_body());
            loop {
                match pinned_body.as_mut().frame().await {
                    Some(Ok(frame)) => {
                        if frame.is_trailers() {
                            break;
                        }
                        if let Ok(chunk) = frame.into_data() {
                            let chunk: Bytes = chunk.into();
                            data.extend_from_slice(&chunk);
                            if let Some(msg_len) = frame_len(&data) {
                                if msg_len > limit {
                                    tracing::warn!(size = msg_len, limit, "export message too large");
                                    return Ok(grpc_error_response(checker_error_to_status(
                                        CheckerError::MessageTooLarge {
                                            size: msg_len,
                                            limit,
                                        },
                                    )));
                                }
                                if data.len() >= 5 + msg_len {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        let e: tonic::codegen::StdError = e.into();
                        tracing::error!(error = %e, "error reading request body");
                        return Ok(grpc_error_response(Status::internal(
                            "failed to read request body",
                        )));
                    }
                    None => break,
                }
            }

            let collected = data.freeze();
            let request = match decode_grpc_message::<proto::ExportMetricsServiceRequest>(
                &collected, limit,
            ) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "export decode failed");
                    return Ok(grpc_error_response(checker_error_to_status(e)));
                }
            };

            let response = match inner.export(Some(&request)) {
                Ok(rendered) => rendered_to_http(rendered),
                Err(e) => grpc_error_response(checker_error_to_status(e)),
            };
            Ok(response)
        })
    }
}
