//! Projection of request messages into log field maps.
//!
//! Messages are rendered with their canonical JSON form and parsed back into a
//! generic map, so field names follow the wire schema. Types generated with
//! `pbjson` (or any `serde::Serialize` type following proto3 JSON rules) get the
//! marshalling half for free through [`ProtoJson`]; tagging them as messages is
//! done with [`request_message!`](crate::request_message).

use serde::Serialize;

use crate::error::{Error, ProjectionStage, Result};
use crate::logger::LogFields;

/// Marshal a value to its canonical JSON bytes.
pub trait ProtoJson {
    fn to_proto_json(&self) -> Result<Vec<u8>, serde_json::Error>;
}

impl<T: Serialize> ProtoJson for T {
    fn to_proto_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Request payload seen by the unary interceptor.
///
/// Returning `None` marks the payload as something other than a
/// schema-tagged message; the interceptor then refuses to project it.
pub trait RequestMessage {
    fn as_message(&self) -> Option<&dyn ProtoJson>;
}

impl RequestMessage for () {
    fn as_message(&self) -> Option<&dyn ProtoJson> {
        None
    }
}

/// Tag one or more types as schema-tagged request messages.
///
/// ```ignore
/// grpclog_rs::request_message!(pb::LoginRequest, pb::LogoutRequest);
/// ```
#[macro_export]
macro_rules! request_message {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::message::RequestMessage for $ty {
                fn as_message(&self) -> ::core::option::Option<&dyn $crate::message::ProtoJson> {
                    ::core::option::Option::Some(self)
                }
            }
        )+
    };
}

/// Render `message` as a JSON object map.
pub fn project(message: &dyn ProtoJson) -> Result<LogFields> {
    let bytes = message
        .to_proto_json()
        .map_err(|source| Error::ProjectionFailed {
            stage: ProjectionStage::Marshal,
            source,
        })?;

    serde_json::from_slice::<LogFields>(&bytes).map_err(|source| Error::ProjectionFailed {
        stage: ProjectionStage::Unmarshal,
        source,
    })
}
