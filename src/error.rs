//! Errors returned by the provider, the interceptors and the accessors.

use thiserror::Error;
use tonic::{Code, Status};

/// Boxed error produced by user hooks (redactors, modifier steps, options).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which half of the message projection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionStage {
    Marshal,
    Unmarshal,
}

impl std::fmt::Display for ProjectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionStage::Marshal => f.write_str("marshal message"),
            ProjectionStage::Unmarshal => f.write_str("unmarshal message from json"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no logger provided to the context")]
    NoLoggerInContext,

    #[error("context value under the logger key is not a Logger")]
    LoggerTypeMismatch,

    #[error("failed to cast request into a protobuf message")]
    FailedToCastProtoMessage,

    #[error("failed to cast protobuf message into map: failed to {stage}: {source}")]
    ProjectionFailed {
        stage: ProjectionStage,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to modify request value (key={key}): {source}")]
    RedactionFailed {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("set option error: {0}")]
    OptionApplyFailed(#[source] BoxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::OptionApplyFailed(_) => Code::InvalidArgument,
            Error::NoLoggerInContext
            | Error::LoggerTypeMismatch
            | Error::FailedToCastProtoMessage
            | Error::ProjectionFailed { .. }
            | Error::RedactionFailed { .. } => Code::Internal,
        };

        Status::new(code, err.to_string())
    }
}
