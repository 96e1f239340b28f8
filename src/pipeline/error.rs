//! Error types and reporting for pipeline stations.

use crate::error::TalkifyError;
use std::fmt;
use std::sync::Mutex;

/// Errors that can occur during station processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationError {
    /// Recoverable error that allows the station to continue processing.
    Recoverable(String),
    /// Fatal error that requires the station to shut down.
    Fatal(String),
}

impl StationError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StationError::Fatal(_))
    }
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            StationError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for StationError {}

/// Contract violations stop the station; everything else is skipped.
impl From<TalkifyError> for StationError {
    fn from(error: TalkifyError) -> Self {
        if error.is_contract_violation() {
            StationError::Fatal(error.to_string())
        } else {
            StationError::Recoverable(error.to_string())
        }
    }
}

/// Trait for reporting station errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a station.
    fn report(&self, station: &str, error: &StationError);
}

/// Reporter that writes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, station: &str, error: &StationError) {
        match error {
            StationError::Recoverable(msg) => tracing::warn!(station, "{msg}"),
            StationError::Fatal(msg) => tracing::error!(station, "{msg}"),
        }
    }
}

/// Forwards to another reporter and remembers the first fatal error.
pub(crate) struct FatalLatch<R: ErrorReporter> {
    inner: R,
    first_fatal: Mutex<Option<(String, String)>>,
}

impl<R: ErrorReporter> FatalLatch<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            first_fatal: Mutex::new(None),
        }
    }

    /// `(station, message)` of the first fatal error, if any.
    pub(crate) fn take(&self) -> Option<(String, String)> {
        self.first_fatal.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl<R: ErrorReporter> ErrorReporter for FatalLatch<R> {
    fn report(&self, station: &str, error: &StationError) {
        self.inner.report(station, error);
        if let StationError::Fatal(msg) = error
            && let Ok(mut slot) = self.first_fatal.lock()
            && slot.is_none()
        {
            *slot = Some((station.to_string(), msg.clone()));
        }
    }
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for std::sync::Arc<R> {
    fn report(&self, station: &str, error: &StationError) {
        (**self).report(station, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_error_display() {
        let recoverable = StationError::Recoverable("frame skipped".to_string());
        assert_eq!(recoverable.to_string(), "Recoverable error: frame skipped");

        let fatal = StationError::Fatal("shape mismatch".to_string());
        assert_eq!(fatal.to_string(), "Fatal error: shape mismatch");
        assert!(fatal.is_fatal());
    }

    #[test]
    fn test_contract_violation_maps_to_fatal() {
        let error: StationError = TalkifyError::FeatureShape {
            expected: 63,
            actual: 60,
        }
        .into();
        assert!(error.is_fatal());

        let error: StationError = TalkifyError::Other("transient".to_string()).into();
        assert_eq!(error, StationError::Recoverable("transient".to_string()));
    }

    #[test]
    fn test_fatal_latch_keeps_first_fatal() {
        let latch = FatalLatch::new(LogReporter);
        latch.report("a", &StationError::Recoverable("skip".to_string()));
        assert_eq!(latch.take(), None);

        latch.report("session", &StationError::Fatal("first".to_string()));
        latch.report("sink", &StationError::Fatal("second".to_string()));
        assert_eq!(
            latch.take(),
            Some(("session".to_string(), "first".to_string()))
        );
    }

    #[test]
    fn test_log_reporter() {
        let reporter = LogReporter;
        // Just ensure it doesn't panic
        reporter.report("TestStation", &StationError::Recoverable("x".to_string()));
    }
}
