use thiserror::Error;

/// Failures raised by the metric log builder.
///
/// Every mutation either applies fully or returns one of these and leaves the
/// record untouched.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("Missing namespace and/or service name while starting the metric log!")]
    MissingRequiredStartParams,

    #[error("String contains non-ASCII characters!")]
    HasNonAsciiCharacters,

    #[error("Value must be between 1-{0} characters!")]
    LengthNotWithinBounds(usize),

    #[error("Cannot add more than {0} items to a single metric log!")]
    CannotAddMoreItemsToArray(usize),

    #[error("Failed to write metric log line: {0}")]
    Emit(#[from] std::io::Error),
}

impl MetricError {
    /// Reports the error on the error channel and hands it back for propagation.
    pub(crate) fn logged(self) -> Self {
        tracing::error!(error = %self, "metric log rejected");
        self
    }
}
