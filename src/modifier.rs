//! Ordered chain of logger modifications applied before every request.

use std::fmt;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::BoxError;
use crate::logger::{LogFields, Logger};

/// One step of the chain: derive a logger for the current request.
pub type ChainStep =
    Arc<dyn Fn(&RequestContext, &Logger) -> Result<Logger, BoxError> + Send + Sync>;

/// Builder and runner for the logger modifications.
///
/// Steps run in insertion order. Each step receives the logger produced by the
/// last step that succeeded; a failing step is skipped.
#[derive(Clone, Default)]
pub struct ModifierChain {
    steps: Vec<ChainStep>,
}

impl ModifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary step.
    pub fn add<F>(&mut self, step: F) -> &mut Self
    where
        F: Fn(&RequestContext, &Logger) -> Result<Logger, BoxError> + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append a step binding the fields returned by `provider`.
    ///
    /// An empty map leaves the logger as it is.
    pub fn add_fields<P>(&mut self, provider: P) -> &mut Self
    where
        P: Fn(&RequestContext) -> LogFields + Send + Sync + 'static,
    {
        self.add(move |ctx, logger| {
            let fields = provider(ctx);
            if fields.is_empty() {
                return Ok(logger.clone());
            }
            Ok(logger.with_fields(fields))
        })
    }

    /// Run every step against `logger`.
    pub fn apply_all(&self, ctx: &RequestContext, logger: &Logger) -> Logger {
        let mut current = logger.clone();

        for (index, step) in self.steps.iter().enumerate() {
            match step(ctx, &current) {
                Ok(modified) => current = modified,
                Err(err) => {
                    tracing::debug!(step = index, error = %err, "logger modifier failed, step skipped");
                }
            }
        }

        current
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for ModifierChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemorySink;
    use serde_json::json;

    fn one(key: &str, value: &str) -> LogFields {
        let mut fields = LogFields::new();
        fields.insert(key.into(), json!(value));
        fields
    }

    #[test]
    fn steps_accumulate_in_order() {
        let mut chain = ModifierChain::new();
        chain
            .add_fields(|_| one("tenant", "t1"))
            .add_fields(|_| one("region", "eu"))
            .add_fields(|_| one("tenant", "t2"));

        let logger = chain.apply_all(&RequestContext::new(), &MemorySink::new().logger());

        assert_eq!(logger.fields().get("tenant"), Some(&json!("t2")));
        assert_eq!(logger.fields().get("region"), Some(&json!("eu")));
    }

    #[test]
    fn failing_step_keeps_last_good_logger() {
        let mut chain = ModifierChain::new();
        chain
            .add_fields(|_| one("a", "1"))
            .add(|_, _| Err("provider exploded".into()))
            .add_fields(|_| one("c", "3"));

        let logger = chain.apply_all(&RequestContext::new(), &MemorySink::new().logger());

        assert_eq!(logger.fields().get("a"), Some(&json!("1")));
        assert_eq!(logger.fields().get("c"), Some(&json!("3")));
        assert_eq!(logger.fields().len(), 2);
    }

    #[test]
    fn empty_provider_returns_input_logger() {
        let mut chain = ModifierChain::new();
        chain.add_fields(|_| LogFields::new());

        let base = MemorySink::new().logger().with_field("x", 1);
        let logger = chain.apply_all(&RequestContext::new(), &base);

        assert_eq!(logger.fields(), base.fields());
    }

    #[test]
    fn provider_reads_request_context() {
        struct TenantKey;

        let mut chain = ModifierChain::new();
        chain.add_fields(|ctx| match ctx.get::<TenantKey, String>() {
            Some(tenant) => one("tenant", tenant),
            None => LogFields::new(),
        });

        let ctx = RequestContext::new().with_value::<TenantKey, _>("acme".to_string());
        let logger = chain.apply_all(&ctx, &MemorySink::new().logger());

        assert_eq!(logger.fields().get("tenant"), Some(&json!("acme")));
    }
}
