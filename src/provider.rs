//! Entry point: build a provider, register modifiers, hand out interceptors.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::grpc::{StreamInterceptor, UnaryInterceptor};
use crate::modifier::ModifierChain;
use crate::options::{Options, ProviderOption};

/// Owns the frozen options and the modifier chain.
///
/// Register modifiers through [`Provider::with_modifiers`] before creating
/// interceptors: each interceptor keeps the chain as it was when it was
/// created.
#[derive(Debug, Clone)]
pub struct Provider {
    options: Arc<Options>,
    modifiers: Arc<ModifierChain>,
}

impl Provider {
    /// Apply `opts` over the defaults, in order.
    pub fn new<I>(opts: I) -> Result<Self>
    where
        I: IntoIterator<Item = ProviderOption>,
    {
        let mut options = Options::default();

        for opt in opts {
            opt(&mut options).map_err(Error::OptionApplyFailed)?;
        }

        Ok(Provider {
            options: Arc::new(options),
            modifiers: Arc::new(ModifierChain::new()),
        })
    }

    /// Provider configured from `config`, followed by `extra` options.
    pub fn from_config<I>(config: Config, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = ProviderOption>,
    {
        Self::new(config.into_options().into_iter().chain(extra))
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn unary_interceptor(&self) -> UnaryInterceptor {
        UnaryInterceptor::new(self.options.clone(), self.modifiers.clone())
    }

    pub fn stream_interceptor(&self) -> StreamInterceptor {
        StreamInterceptor::new(self.options.clone(), self.modifiers.clone())
    }

    /// Builder for the logger modifications applied to every request.
    pub fn with_modifiers(&mut self) -> &mut ModifierChain {
        Arc::make_mut(&mut self.modifiers)
    }
}
