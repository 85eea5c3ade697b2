use emflog::config::{ENV_NAMESPACE, ENV_SERVICE_NAME};
use emflog::context::NoMetadata;
use emflog::{start, MetricError, MetricLog, StartOptions, Unit};
use serde_json::json;
use serial_test::serial;

fn clear_env() {
    std::env::remove_var(ENV_NAMESPACE);
    std::env::remove_var(ENV_SERVICE_NAME);
}

#[test]
#[serial]
fn test_start_without_names_fails() {
    clear_env();

    let err = MetricLog::start(StartOptions::default()).unwrap_err();
    assert!(matches!(err, MetricError::MissingRequiredStartParams));

    let err = MetricLog::start(StartOptions::default().with_namespace("MyNamespace")).unwrap_err();
    assert!(matches!(err, MetricError::MissingRequiredStartParams));

    let err = MetricLog::start(StartOptions::default().with_service_name("MyService")).unwrap_err();
    assert!(matches!(err, MetricError::MissingRequiredStartParams));
}

#[test]
#[serial]
fn test_empty_explicit_names_count_as_missing() {
    clear_env();
    let err = MetricLog::start(StartOptions::new("", "")).unwrap_err();
    assert!(matches!(err, MetricError::MissingRequiredStartParams));
}

#[test]
#[serial]
fn test_namespace_from_environment() {
    clear_env();
    std::env::set_var(ENV_NAMESPACE, "EnvNamespace");

    let log = MetricLog::start(StartOptions::default().with_service_name("MyService")).unwrap();

    assert_eq!(log.namespace(), "EnvNamespace");
    clear_env();
}

#[test]
#[serial]
fn test_service_name_from_environment() {
    clear_env();
    std::env::set_var(ENV_SERVICE_NAME, "EnvService");

    let log = MetricLog::start(StartOptions::default().with_namespace("MyNamespace")).unwrap();

    assert_eq!(log.service_name(), "EnvService");
    clear_env();
}

#[test]
#[serial]
fn test_explicit_names_beat_environment() {
    clear_env();
    std::env::set_var(ENV_NAMESPACE, "EnvNamespace");
    std::env::set_var(ENV_SERVICE_NAME, "EnvService");

    let log = MetricLog::start(StartOptions::new("MyNamespace", "MyService")).unwrap();

    assert_eq!(log.namespace(), "MyNamespace");
    assert_eq!(log.service_name(), "MyService");
    clear_env();
}

#[test]
#[serial]
fn test_restart_keeps_accumulated_record() {
    clear_env();
    let mut slot = None;

    // 1. First start builds the log
    let log = start(
        &mut slot,
        StartOptions::new("MyNamespace", "MyService").with_metadata_source(NoMetadata),
    )
    .unwrap();
    log.put_metric("Duration", 83, Unit::Milliseconds).unwrap();

    // 2. Second start reuses it with new names
    let log = start(&mut slot, StartOptions::new("OtherNamespace", "OtherService")).unwrap();
    assert_eq!(log.namespace(), "OtherNamespace");
    assert_eq!(log.service_name(), "OtherService");
    assert_eq!(log.record().metric_definitions().len(), 1);

    let mut out = Vec::new();
    let record = log.flush_to(&mut out).unwrap();
    assert_eq!(record.get("Duration"), Some(&json!(83)));
    assert_eq!(record.service(), Some("OtherService"));
    assert_eq!(record.namespace().as_deref(), Some("OtherNamespace"));
}

#[test]
#[serial]
fn test_restart_with_missing_name_fails() {
    clear_env();
    let mut slot = None;
    start(&mut slot, StartOptions::new("MyNamespace", "MyService")).unwrap();

    let err = start(&mut slot, StartOptions::default().with_namespace("MyNamespace")).unwrap_err();
    assert!(matches!(err, MetricError::MissingRequiredStartParams));

    // The existing log is untouched
    let log = slot.as_ref().unwrap();
    assert_eq!(log.service_name(), "MyService");
}

#[test]
#[serial]
fn test_restart_keeps_previous_correlation_id_when_unset() {
    clear_env();
    let mut log = MetricLog::start(
        StartOptions::new("MyNamespace", "MyService")
            .with_metadata_source(NoMetadata)
            .with_correlation_id("first"),
    )
    .unwrap();

    log.restart(StartOptions::new("MyNamespace", "MyService")).unwrap();
    assert_eq!(log.correlation_id(), "first");

    log.restart(StartOptions::new("MyNamespace", "MyService").with_correlation_id("second"))
        .unwrap();
    assert_eq!(log.correlation_id(), "second");
}
