//! Call descriptors handed to the interceptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tonic::{GrpcMethod, Request};

const UNKNOWN_METHOD: &str = "unknown";

/// Describes a unary call, counterpart of the method info a gRPC server passes
/// to its interceptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnaryServerInfo {
    /// Fully-qualified method, `/package.Service/Method`.
    pub full_method: String,
    /// Service the method belongs to.
    pub server: String,
}

impl UnaryServerInfo {
    pub fn new(full_method: impl Into<String>, server: impl Into<String>) -> Self {
        UnaryServerInfo {
            full_method: full_method.into(),
            server: server.into(),
        }
    }

    /// Read the method tonic records in the request extensions.
    pub fn from_request<T>(request: &Request<T>) -> Self {
        match request.extensions().get::<GrpcMethod>() {
            Some(method) => UnaryServerInfo {
                full_method: full_method(method),
                server: method.service().to_string(),
            },
            None => UnaryServerInfo {
                full_method: UNKNOWN_METHOD.to_string(),
                server: String::new(),
            },
        }
    }
}

/// Describes a streaming call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamServerInfo {
    pub full_method: String,
    pub is_client_stream: bool,
    pub is_server_stream: bool,
}

impl StreamServerInfo {
    pub fn new(
        full_method: impl Into<String>,
        is_client_stream: bool,
        is_server_stream: bool,
    ) -> Self {
        StreamServerInfo {
            full_method: full_method.into(),
            is_client_stream,
            is_server_stream,
        }
    }

    pub fn from_request<T>(
        request: &Request<T>,
        is_client_stream: bool,
        is_server_stream: bool,
    ) -> Self {
        let full_method = request
            .extensions()
            .get::<GrpcMethod>()
            .map(full_method)
            .unwrap_or_else(|| UNKNOWN_METHOD.to_string());

        StreamServerInfo {
            full_method,
            is_client_stream,
            is_server_stream,
        }
    }

    /// JSON form bound under `streamInfo`.
    pub fn to_value(&self) -> Value {
        // Strings and bools only, serialization cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn full_method(method: &GrpcMethod) -> String {
    format!("/{}/{}", method.service(), method.method())
}
