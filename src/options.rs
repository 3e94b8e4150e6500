//! Provider options, assembled once by [`Provider::new`](crate::Provider::new).

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;
use crate::logger::Logger;
use crate::redact::ValueRedactor;

/// Frozen provider configuration.
#[derive(Clone)]
pub struct Options {
    // Whether to log the start of each request.
    pub(crate) log_requests: bool,
    // Whether to log failed requests after completion.
    pub(crate) log_errors: bool,
    // Whether to bind request, method and server (or stream info) fields.
    pub(crate) provide_request_fields: bool,
    // Whether to bind a fresh UUID v4 request identifier.
    pub(crate) use_request_id: bool,
    pub(crate) logger: Logger,
    pub(crate) value_redactor: Option<ValueRedactor>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            log_requests: true,
            log_errors: true,
            provide_request_fields: true,
            use_request_id: true,
            logger: Logger::stdout(),
            value_redactor: None,
        }
    }
}

impl Options {
    pub fn log_requests(&self) -> bool {
        self.log_requests
    }

    pub fn log_errors(&self) -> bool {
        self.log_errors
    }

    pub fn provide_request_fields(&self) -> bool {
        self.provide_request_fields
    }

    pub fn use_request_id(&self) -> bool {
        self.use_request_id
    }

    /// Base logger every request logger is derived from.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn value_redactor(&self) -> Option<&ValueRedactor> {
        self.value_redactor.as_ref()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("log_requests", &self.log_requests)
            .field("log_errors", &self.log_errors)
            .field("provide_request_fields", &self.provide_request_fields)
            .field("use_request_id", &self.use_request_id)
            .field("logger", &self.logger)
            .field("value_redactor", &self.value_redactor.is_some())
            .finish()
    }
}

/// A single configuration step. Returning an error aborts provider construction.
pub type ProviderOption = Box<dyn FnOnce(&mut Options) -> Result<(), BoxError> + Send>;

/// Log `"new unary request"` / `"new stream request"` on entry. Default `true`.
pub fn with_log_requests(logging: bool) -> ProviderOption {
    Box::new(move |opts| {
        opts.log_requests = logging;
        Ok(())
    })
}

/// Log failed requests after the handler returns. Default `true`.
pub fn with_log_errors(logging: bool) -> ProviderOption {
    Box::new(move |opts| {
        opts.log_errors = logging;
        Ok(())
    })
}

/// Bind request fields (`request`, `method`, `server`, `streamInfo`). Default `true`.
pub fn with_provide_request_fields_to_logger(provide_fields: bool) -> ProviderOption {
    Box::new(move |opts| {
        opts.provide_request_fields = provide_fields;
        Ok(())
    })
}

/// Bind a fresh `requestId` to each request logger. Default `true`.
pub fn with_use_request_id(use_request_id: bool) -> ProviderOption {
    Box::new(move |opts| {
        opts.use_request_id = use_request_id;
        Ok(())
    })
}

/// Replace the default stdout logger.
pub fn with_logger(logger: Logger) -> ProviderOption {
    Box::new(move |opts| {
        opts.logger = logger;
        Ok(())
    })
}

/// Rewrite request values before they are bound, e.g. to mask secrets.
pub fn with_value_redactor<F>(redactor: F) -> ProviderOption
where
    F: Fn(&str, Value) -> Result<Value, BoxError> + Send + Sync + 'static,
{
    let redactor: ValueRedactor = Arc::new(redactor);
    Box::new(move |opts| {
        opts.value_redactor = Some(redactor);
        Ok(())
    })
}
