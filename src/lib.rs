//! grpclog_rs
//!
//! Per-request structured logger injection for tonic gRPC servers.
//!
//! Key features:
//! - Unary and stream interceptors deriving a logger for every call
//!   (`unaryInterceptor`, `requestId`, request body, method, server / stream info)
//! - Logger carried in the request context and read back with [`try_get`] / [`must_get`]
//! - Modifier chain binding caller-supplied fields before each call
//! - Value redactor masking sensitive request fields before they are logged
//! - Pluggable sinks: stdout JSON lines by default, in-memory, background worker, `tracing`
//!
//! ```ignore
//! let mut provider = grpclog_rs::Provider::new([
//!     grpclog_rs::with_value_redactor(|key, value| {
//!         if key == "password" {
//!             return Ok("<sensitive>".into());
//!         }
//!         Ok(value)
//!     }),
//! ])?;
//! provider.with_modifiers().add_fields(|_ctx| tenant_fields());
//!
//! let unary = provider.unary_interceptor();
//! let stream = provider.stream_interceptor();
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod generalkey;
pub mod grpc;
pub mod logger;
pub mod message;
pub mod model;
pub mod modifier;
pub mod options;
pub mod provider;
pub mod redact;

pub use crate::api::{must_get, try_get, try_get_from_request};
pub use crate::config::Config;
pub use crate::context::RequestContext;
pub use crate::error::{BoxError, Error, ProjectionStage, Result};
pub use crate::grpc::{ServerStream, ServerStreamWrapper, StreamInterceptor, UnaryInterceptor};
pub use crate::logger::{
    BackgroundSink, Level, LogFields, LogRecord, LogSink, Logger, MemorySink, StdoutSink,
    TracingSink, WriterSink,
};
pub use crate::message::{ProtoJson, RequestMessage};
pub use crate::model::{StreamServerInfo, UnaryServerInfo};
pub use crate::modifier::{ChainStep, ModifierChain};
pub use crate::options::{
    Options, ProviderOption, with_log_errors, with_log_requests, with_logger,
    with_provide_request_fields_to_logger, with_use_request_id, with_value_redactor,
};
pub use crate::provider::Provider;
pub use crate::redact::ValueRedactor;
