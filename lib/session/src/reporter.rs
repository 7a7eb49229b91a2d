// Error reporting channel between the session layer and the UI
use crate::{ClientError, ErrorKind, SessionError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::error;

/// Where session failures go.
///
/// Transport problems (server down, bad credentials) and internal defects
/// travel on separate channels so the UI can word them differently.
pub trait ErrorReporter: Send + Sync {
    /// `context` is only evaluated if the reporter actually renders the message
    fn report_transport_error(&self, error: &ClientError, context: &dyn Fn() -> String);

    fn report_internal_error(&self, error: &SessionError);
}

/// Reporter that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report_transport_error(&self, error: &ClientError, context: &dyn Fn() -> String) {
        error!("{}: {}", context(), error);
    }

    fn report_internal_error(&self, error: &SessionError) {
        error!("Internal error ({:?}): {}", error.kind(), error);
    }
}

/// A rendered report waiting to be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ErrorKind,
    pub message: String,
}

/// Bounded queue of reports the UI drains once per frame, oldest dropped first
pub struct QueuedReporter {
    reports: Mutex<VecDeque<Report>>,
    max: usize,
}

impl QueuedReporter {
    pub fn new(max: usize) -> Self {
        Self {
            reports: Mutex::new(VecDeque::new()),
            max: max.max(1),
        }
    }

    fn push(&self, report: Report) {
        let mut reports = self.reports.lock();
        if reports.len() == self.max {
            reports.pop_front();
        }
        reports.push_back(report);
    }

    pub fn drain(&self) -> Vec<Report> {
        self.reports.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl Default for QueuedReporter {
    fn default() -> Self {
        Self::new(32)
    }
}

impl ErrorReporter for QueuedReporter {
    fn report_transport_error(&self, error: &ClientError, context: &dyn Fn() -> String) {
        TracingReporter.report_transport_error(error, context);
        self.push(Report {
            kind: ErrorKind::Transport,
            message: format!("{}: {}", context(), error),
        });
    }

    fn report_internal_error(&self, error: &SessionError) {
        TracingReporter.report_internal_error(error);
        self.push(Report {
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_keeps_channels_apart() {
        let reporter = QueuedReporter::new(8);
        reporter.report_transport_error(&ClientError::Authentication("denied".into()), &|| {
            "Failed to load databases at address db:1729".to_string()
        });
        reporter.report_internal_error(&SessionError::Validation("server address is blank".into()));

        let reports = reporter.drain();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].kind, ErrorKind::Transport);
        assert!(reports[0].message.contains("db:1729"));
        assert_eq!(reports[1].kind, ErrorKind::Validation);
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let reporter = QueuedReporter::new(2);
        for i in 0..3 {
            reporter.report_internal_error(&SessionError::Validation(format!("problem {}", i)));
        }
        let reports = reporter.drain();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].message.ends_with("problem 1"));
    }
}
