//! Ambient per-request value bag and the logger carrier stored in it.
//!
//! `RequestContext` is a persistent linked list keyed by Rust types: adding a
//! value returns a new context and never touches the one it was derived from.
//! It travels with the request inside `tonic::Request` extensions.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tonic::Request;

use crate::error::{Error, Result};
use crate::logger::Logger;

/// Per-request value bag.
#[derive(Clone, Default)]
pub struct RequestContext {
    head: Option<Arc<Entry>>,
}

struct Entry {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context identical to `self` except that key type `K` maps to `value`.
    pub fn with_value<K: 'static, V: Any + Send + Sync>(&self, value: V) -> RequestContext {
        RequestContext {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<K>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Most recent value stored under key type `K`.
    pub fn value<K: 'static>(&self) -> Option<&(dyn Any + Send + Sync)> {
        let key = TypeId::of::<K>();
        let mut cursor = self.head.as_deref();

        while let Some(entry) = cursor {
            if entry.key == key {
                return Some(entry.value.as_ref());
            }
            cursor = entry.parent.as_deref();
        }

        None
    }

    /// Typed shortcut over [`RequestContext::value`].
    pub fn get<K: 'static, V: 'static>(&self) -> Option<&V> {
        self.value::<K>()?.downcast_ref::<V>()
    }

    /// Context carried by `request`, or an empty one.
    pub fn from_request<T>(request: &Request<T>) -> RequestContext {
        request
            .extensions()
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default()
    }

    /// Store this context in `request`, replacing the previous one.
    pub fn attach<T>(self, request: &mut Request<T>) {
        request.extensions_mut().insert(self);
    }

    fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.head.as_deref();
        while let Some(entry) = cursor {
            depth += 1;
            cursor = entry.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("values", &self.depth())
            .finish()
    }
}

// Carrier key. Private, so nothing outside the crate can read or shadow it.
struct LoggerKey;

/// Context with `logger` attached under the carrier key.
pub fn inject(ctx: &RequestContext, logger: Logger) -> RequestContext {
    ctx.with_value::<LoggerKey, _>(logger)
}

/// Logger attached to `ctx`.
pub fn try_extract(ctx: &RequestContext) -> Result<Logger> {
    let value = ctx.value::<LoggerKey>().ok_or(Error::NoLoggerInContext)?;

    value
        .downcast_ref::<Logger>()
        .cloned()
        .ok_or(Error::LoggerTypeMismatch)
}

/// Logger attached to `ctx`.
///
/// # Panics
///
/// Panics when no logger was injected.
pub fn must_extract(ctx: &RequestContext) -> Logger {
    match try_extract(ctx) {
        Ok(logger) => logger,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemorySink;

    struct TenantKey;

    #[test]
    fn inject_then_extract_returns_same_fields() {
        let logger = MemorySink::new().logger().with_field("a", 1);
        let ctx = inject(&RequestContext::new(), logger);

        let found = try_extract(&ctx).expect("logger present");
        assert_eq!(found.fields().get("a"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn missing_logger_is_reported() {
        let err = try_extract(&RequestContext::new()).unwrap_err();
        assert!(matches!(err, Error::NoLoggerInContext));
    }

    #[test]
    fn foreign_value_under_carrier_key_is_a_mismatch() {
        let ctx = RequestContext::new().with_value::<LoggerKey, _>("not a logger".to_string());
        let err = try_extract(&ctx).unwrap_err();
        assert!(matches!(err, Error::LoggerTypeMismatch));
    }

    #[test]
    fn inject_keeps_application_values_visible() {
        let ctx = RequestContext::new().with_value::<TenantKey, _>("t1");
        let ctx = inject(&ctx, MemorySink::new().logger());

        assert_eq!(ctx.get::<TenantKey, &str>(), Some(&"t1"));
        assert!(try_extract(&ctx).is_ok());
    }

    #[test]
    fn derived_context_does_not_change_parent() {
        let parent = RequestContext::new();
        let _child = inject(&parent, MemorySink::new().logger());

        assert!(parent.value::<LoggerKey>().is_none());
    }

    #[test]
    #[should_panic(expected = "no logger provided to the context")]
    fn must_extract_panics_without_logger() {
        must_extract(&RequestContext::new());
    }
}
