//! Logger retrieval for handlers.

use tonic::Request;

use crate::context::{self, RequestContext};
use crate::error::Result;
use crate::logger::Logger;

/// Logger provided to the context by an interceptor.
pub fn try_get(ctx: &RequestContext) -> Result<Logger> {
    context::try_extract(ctx)
}

/// Logger provided to the context by an interceptor.
///
/// # Panics
///
/// Panics when the request did not go through an interceptor.
pub fn must_get(ctx: &RequestContext) -> Logger {
    context::must_extract(ctx)
}

/// Logger carried by the context stored in `request`.
pub fn try_get_from_request<T>(request: &Request<T>) -> Result<Logger> {
    try_get(&RequestContext::from_request(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::logger::MemorySink;

    #[test]
    fn try_get_reads_injected_logger() {
        let ctx = context::inject(&RequestContext::new(), MemorySink::new().logger());
        assert!(try_get(&ctx).is_ok());
    }

    #[test]
    fn try_get_from_request_without_context() {
        let err = try_get_from_request(&Request::new(())).unwrap_err();
        assert!(matches!(err, Error::NoLoggerInContext));
    }

    #[test]
    fn try_get_from_request_with_attached_context() {
        let mut request = Request::new(());
        context::inject(&RequestContext::new(), MemorySink::new().logger()).attach(&mut request);

        assert!(try_get_from_request(&request).is_ok());
    }

    #[test]
    #[should_panic(expected = "no logger provided to the context")]
    fn must_get_panics_without_logger() {
        must_get(&RequestContext::new());
    }
}
