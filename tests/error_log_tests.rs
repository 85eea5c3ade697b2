use emflog::context::NoMetadata;
use emflog::{MetricError, MetricLog, StartOptions, Unit};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Collects everything the subscriber writes.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buf.contents())
}

fn quiet_log() -> MetricLog {
    let options = StartOptions::new("MyNamespace", "MyService").with_metadata_source(NoMetadata);
    MetricLog::start(options).unwrap()
}

#[test]
fn test_rejected_property_is_logged_as_error() {
    let mut log = quiet_log();

    let (result, output) = capture(|| log.set_property("", ""));

    assert!(matches!(result, Err(MetricError::LengthNotWithinBounds(255))));
    assert!(output.contains("ERROR"), "no error event in: {}", output);
    assert!(output.contains("Value must be between 1-255 characters!"));
}

#[test]
fn test_rejected_metric_key_is_logged_as_error() {
    let mut log = quiet_log();

    let (result, output) = capture(|| log.put_metric("Dur\u{e9}e", 1, Unit::Count));

    assert!(matches!(result, Err(MetricError::HasNonAsciiCharacters)));
    assert!(output.contains("ERROR"));
    assert!(output.contains("String contains non-ASCII characters!"));
}

#[test]
fn test_missing_start_params_is_logged_as_error() {
    let (result, output) = capture(|| MetricLog::start(StartOptions::new("", "MyService")));

    assert!(matches!(result, Err(MetricError::MissingRequiredStartParams)));
    assert!(output.contains("ERROR"));
}

#[test]
fn test_accepted_calls_log_no_errors() {
    let mut log = quiet_log();

    let (result, output) = capture(|| {
        log.put_dimension("User", "Sam Person")?;
        log.put_metric("Duration", 83, Unit::Milliseconds)?;
        log.set_property("Label", "checkout")
    });

    assert!(result.is_ok());
    assert!(!output.contains("ERROR"), "unexpected error event in: {}", output);
}
