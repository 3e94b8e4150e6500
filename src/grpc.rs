//! Unary and stream interceptors for tonic services.
//!
//! Both interceptors wrap a handler closure the way a gRPC server interceptor
//! wraps its continuation:
//! - derive a per-request logger from the base logger (modifier chain,
//!   `unaryInterceptor`, `requestId`, request fields),
//! - log the entry event,
//! - hand the logger to the handler through the request context,
//! - log the failure when the handler returns an error.
//!
//! ```ignore
//! async fn login(&self, request: Request<LoginRequest>) -> Result<Response<LoginReply>, Status> {
//!     let info = UnaryServerInfo::from_request(&request);
//!     self.unary
//!         .intercept(request, info, |request| async move {
//!             let logger = grpclog_rs::must_get(&RequestContext::from_request(&request));
//!             logger.info("checking credentials");
//!             Ok(Response::new(LoginReply::default()))
//!         })
//!         .await
//! }
//! ```

use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use serde_json::Value;
use tonic::{Request, Status};
use uuid::Uuid;

use crate::context::{self, RequestContext};
use crate::error::{Error, Result};
use crate::generalkey;
use crate::logger::{LogFields, Logger};
use crate::message::{self, RequestMessage};
use crate::model::{StreamServerInfo, UnaryServerInfo};
use crate::modifier::ModifierChain;
use crate::options::Options;
use crate::redact;

/// State shared by both interceptors: the frozen options and a snapshot of the
/// modifier chain taken when the interceptor was created.
#[derive(Debug, Clone)]
struct Shared {
    options: Arc<Options>,
    modifiers: Arc<ModifierChain>,
}

impl Shared {
    fn handler_logger(&self, ctx: &RequestContext, unary: bool) -> Logger {
        let logger = self
            .modifiers
            .apply_all(ctx, self.options.logger())
            .with_field(generalkey::UNARY_INTERCEPTOR, unary);

        if self.options.use_request_id {
            return logger.with_field(generalkey::REQUEST_ID, Uuid::new_v4().to_string());
        }

        logger
    }
}

/// Interceptor for unary calls. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UnaryInterceptor {
    shared: Shared,
}

impl UnaryInterceptor {
    pub(crate) fn new(options: Arc<Options>, modifiers: Arc<ModifierChain>) -> Self {
        UnaryInterceptor {
            shared: Shared { options, modifiers },
        }
    }

    /// Run `handler` for `request` with a request logger in its context.
    ///
    /// Fails before calling the handler when request fields are enabled and
    /// the payload cannot be projected or redacted.
    pub async fn intercept<Req, R, F, Fut>(
        &self,
        mut request: Request<Req>,
        info: UnaryServerInfo,
        handler: F,
    ) -> Result<R, Status>
    where
        Req: RequestMessage,
        F: FnOnce(Request<Req>) -> Fut,
        Fut: Future<Output = Result<R, Status>>,
    {
        let options = &self.shared.options;
        let ctx = RequestContext::from_request(&request);
        let logger = self.shared.handler_logger(&ctx, true);

        // The request body goes on the entry record only, never on the error record.
        let entry_logger = if options.provide_request_fields {
            logger.with_fields(self.request_fields(request.get_ref(), &info)?)
        } else {
            logger.clone()
        };

        if options.log_requests {
            entry_logger.debug(generalkey::MSG_NEW_UNARY_REQUEST);
        }

        context::inject(&ctx, logger.clone()).attach(&mut request);

        let result = handler(request).await;
        if let Err(status) = &result
            && options.log_errors
        {
            logger.error(status.message(), generalkey::MSG_UNARY_REQUEST_ERROR);
        }

        result
    }

    fn request_fields<Req: RequestMessage>(
        &self,
        request: &Req,
        info: &UnaryServerInfo,
    ) -> Result<LogFields, Error> {
        let message = request
            .as_message()
            .ok_or(Error::FailedToCastProtoMessage)?;

        let mut request_map = message::project(message)?;
        if let Some(redactor) = &self.shared.options.value_redactor {
            redact::walk(&mut request_map, &**redactor)?;
        }

        let mut fields = LogFields::new();
        fields.insert(generalkey::REQUEST.into(), Value::Object(request_map));
        fields.insert(
            generalkey::METHOD.into(),
            Value::String(info.full_method.clone()),
        );
        fields.insert(generalkey::SERVER.into(), Value::String(info.server.clone()));

        Ok(fields)
    }
}

/// A stream object handed to a streaming handler.
///
/// The only capability the interceptor relies on is reading the stream's
/// request context.
pub trait ServerStream {
    fn context(&self) -> RequestContext;
}

impl<T> ServerStream for Request<T> {
    fn context(&self) -> RequestContext {
        RequestContext::from_request(self)
    }
}

/// Pass-through over a stream object that reports an enriched context.
///
/// Everything except [`ServerStream::context`] goes to the wrapped stream,
/// through `Deref`/`DerefMut` and, for inner streams, `Stream`.
#[derive(Debug)]
pub struct ServerStreamWrapper<S> {
    inner: S,
    ctx: RequestContext,
}

impl<S> ServerStreamWrapper<S> {
    pub fn new(inner: S, ctx: RequestContext) -> Self {
        ServerStreamWrapper { inner, ctx }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<T> ServerStreamWrapper<Request<T>> {
    /// Unwrap the request with the enriched context stored in its extensions.
    pub fn into_request(self) -> Request<T> {
        let ServerStreamWrapper { mut inner, ctx } = self;
        ctx.attach(&mut inner);
        inner
    }
}

impl<S> ServerStream for ServerStreamWrapper<S> {
    fn context(&self) -> RequestContext {
        self.ctx.clone()
    }
}

impl<S> Deref for ServerStreamWrapper<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S> DerefMut for ServerStreamWrapper<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: Stream + Unpin> Stream for ServerStreamWrapper<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut Pin::get_mut(self).inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Interceptor for streaming calls. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StreamInterceptor {
    shared: Shared,
}

impl StreamInterceptor {
    pub(crate) fn new(options: Arc<Options>, modifiers: Arc<ModifierChain>) -> Self {
        StreamInterceptor {
            shared: Shared { options, modifiers },
        }
    }

    /// Run `handler` for `stream`, which sees the request logger through
    /// [`ServerStream::context`] of the wrapper it receives.
    pub async fn intercept<Srv, S, R, F, Fut>(
        &self,
        srv: Srv,
        stream: S,
        info: StreamServerInfo,
        handler: F,
    ) -> Result<R, Status>
    where
        S: ServerStream,
        F: FnOnce(Srv, ServerStreamWrapper<S>) -> Fut,
        Fut: Future<Output = Result<R, Status>>,
    {
        let options = &self.shared.options;
        let ctx = stream.context();

        let mut logger = self.shared.handler_logger(&ctx, false);
        if options.provide_request_fields {
            logger = logger.with_field(generalkey::STREAM_INFO, info.to_value());
        }

        if options.log_requests {
            logger.debug(generalkey::MSG_NEW_STREAM_REQUEST);
        }

        let wrapper = ServerStreamWrapper::new(stream, context::inject(&ctx, logger.clone()));

        let result = handler(srv, wrapper).await;
        if let Err(status) = &result
            && options.log_errors
        {
            logger.error(status.message(), generalkey::MSG_STREAM_REQUEST_ERROR);
        }

        result
    }
}
