use grpclog_rs::{Config, MemorySink, Provider, with_logger};

#[test]
fn config_defaults_enable_everything() {
    let cfg: Config = serde_json::from_str("{}").expect("parse config");
    assert_eq!(cfg, Config::default());
    assert!(cfg.log_requests && cfg.log_errors && cfg.provide_request_fields && cfg.use_request_id);
}

#[test]
fn config_reads_camel_case_keys() {
    let cfg: Config = serde_json::from_str(
        r#"{ "logRequests": false, "provideRequestFields": false, "useRequestId": false }"#,
    )
    .expect("parse config");

    assert!(!cfg.log_requests);
    assert!(cfg.log_errors);
    assert!(!cfg.provide_request_fields);
    assert!(!cfg.use_request_id);
}

#[test]
fn provider_from_config_applies_toggles() {
    let cfg = Config {
        log_requests: false,
        log_errors: true,
        provide_request_fields: false,
        use_request_id: true,
    };

    let sink = MemorySink::new();
    let provider = Provider::from_config(cfg, [with_logger(sink.logger())]).expect("provider");
    let options = provider.options();

    assert!(!options.log_requests());
    assert!(options.log_errors());
    assert!(!options.provide_request_fields());
    assert!(options.use_request_id());
}
