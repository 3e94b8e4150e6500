//! Field names and messages written by the interceptors.

/// Marks whether the record comes from the unary (`true`) or stream (`false`) interceptor.
pub const UNARY_INTERCEPTOR: &str = "unaryInterceptor";

/// Per-invocation UUID v4 identifier.
pub const REQUEST_ID: &str = "requestId";

/// Projected unary request message.
pub const REQUEST: &str = "request";

/// Fully-qualified gRPC method, e.g. `/svc.S/M`.
pub const METHOD: &str = "method";

/// Server descriptor of a unary call.
pub const SERVER: &str = "server";

/// Stream descriptor of a streaming call.
pub const STREAM_INFO: &str = "streamInfo";

// Record envelope.
pub const LEVEL: &str = "level";
pub const MESSAGE: &str = "message";
pub const TIME: &str = "time";
pub const ERROR: &str = "error";

pub const MSG_NEW_UNARY_REQUEST: &str = "new unary request";
pub const MSG_UNARY_REQUEST_ERROR: &str = "unary request error";
pub const MSG_NEW_STREAM_REQUEST: &str = "new stream request";
pub const MSG_STREAM_REQUEST_ERROR: &str = "stream request error";
