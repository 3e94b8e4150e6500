use serde::{Deserialize, Serialize};

use crate::options::{
    ProviderOption, with_log_errors, with_log_requests, with_provide_request_fields_to_logger,
    with_use_request_id,
};

/// Serializable form of the provider toggles, for loading from a config file:
///
/// ```json
/// { "logRequests": true, "logErrors": true, "provideRequestFields": false, "useRequestId": true }
/// ```
///
/// Missing keys keep their defaults (all `true`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub log_requests: bool,
    pub log_errors: bool,
    pub provide_request_fields: bool,
    pub use_request_id: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_requests: true,
            log_errors: true,
            provide_request_fields: true,
            use_request_id: true,
        }
    }
}

impl Config {
    /// Option list equivalent to this config.
    pub fn into_options(self) -> Vec<ProviderOption> {
        vec![
            with_log_requests(self.log_requests),
            with_log_errors(self.log_errors),
            with_provide_request_fields_to_logger(self.provide_request_fields),
            with_use_request_id(self.use_request_id),
        ]
    }
}
