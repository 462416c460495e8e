//! The logging collaborator the engine reports stage failures to.
//!
//! Recording a failure and deciding whether to halt are separate concerns:
//! an [`ErrorLog`] only records, the halt decision comes from
//! [`InvolveConfig`](crate::config::InvolveConfig).

use crate::config::ExecutionMode;
use crate::stages::StageKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::error;

/// A stage failure as seen by an [`ErrorLog`].
#[derive(Debug, Clone, Copy)]
pub struct StageFailure<'a> {
    /// The class of stage that failed.
    pub kind: StageKind,
    /// Position of the stage within its class (always 0 for the target).
    pub index: usize,
    /// The stage name.
    pub stage: &'a str,
    /// The failure itself.
    pub error: &'a anyhow::Error,
    /// Whether this failure halts the run.
    pub halting: bool,
}

/// Receives every failure the engine contains or halts on.
///
/// The engine calls [`ErrorLog::log`] exactly once per failure,
/// synchronously, before acting on it. Implementations must not panic.
pub trait ErrorLog: Send + Sync {
    /// Records a failure.
    fn log(&self, failure: &StageFailure<'_>);
}

/// An error log that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpErrorLog;

impl ErrorLog for NoOpErrorLog {
    fn log(&self, _failure: &StageFailure<'_>) {}
}

/// An error log that emits `tracing` events, silent in test mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorLog {
    mode: ExecutionMode,
}

impl TracingErrorLog {
    /// Creates a tracing error log for the given mode.
    #[must_use]
    pub const fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    /// Creates a tracing error log that never emits.
    #[must_use]
    pub const fn test() -> Self {
        Self::new(ExecutionMode::Test)
    }

    /// Returns the execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

impl ErrorLog for TracingErrorLog {
    fn log(&self, failure: &StageFailure<'_>) {
        if self.mode.is_test() {
            return;
        }

        error!(
            stage_kind = %failure.kind,
            stage_index = failure.index,
            stage = failure.stage,
            halting = failure.halting,
            error = %failure.error,
            "{} '{}' failed", failure.kind, failure.stage
        );
    }
}

/// An owned copy of a logged failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedFailure {
    /// The class of stage that failed.
    pub kind: StageKind,
    /// Position of the stage within its class.
    pub index: usize,
    /// The stage name.
    pub stage: String,
    /// The rendered error message.
    pub message: String,
    /// Whether the failure halted the run.
    pub halting: bool,
}

impl From<&StageFailure<'_>> for LoggedFailure {
    fn from(failure: &StageFailure<'_>) -> Self {
        Self {
            kind: failure.kind,
            index: failure.index,
            stage: failure.stage.to_string(),
            message: failure.error.to_string(),
            halting: failure.halting,
        }
    }
}

/// An error log that keeps every failure, for assertions.
#[derive(Debug, Default)]
pub struct CollectingErrorLog {
    entries: RwLock<Vec<LoggedFailure>>,
}

impl CollectingErrorLog {
    /// Creates a new collecting log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all collected failures.
    #[must_use]
    pub fn entries(&self) -> Vec<LoggedFailure> {
        self.entries.read().clone()
    }

    /// Returns the failures of one stage class.
    #[must_use]
    pub fn entries_of(&self, kind: StageKind) -> Vec<LoggedFailure> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect()
    }

    /// Returns the number of collected failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clears all collected failures.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl ErrorLog for CollectingErrorLog {
    fn log(&self, failure: &StageFailure<'_>) {
        self.entries.write().push(LoggedFailure::from(failure));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn failure<'a>(error: &'a anyhow::Error, kind: StageKind) -> StageFailure<'a> {
        StageFailure {
            kind,
            index: 2,
            stage: "auth",
            error,
            halting: false,
        }
    }

    #[test]
    fn test_noop_log_accepts_everything() {
        let error = anyhow::anyhow!("ignored");
        NoOpErrorLog.log(&failure(&error, StageKind::Middleware));
    }

    #[test]
    fn test_tracing_log_modes() {
        assert_eq!(TracingErrorLog::default().mode(), ExecutionMode::Normal);
        assert_eq!(TracingErrorLog::test().mode(), ExecutionMode::Test);

        let error = anyhow::anyhow!("quiet");
        TracingErrorLog::test().log(&failure(&error, StageKind::Target));
        TracingErrorLog::default().log(&failure(&error, StageKind::Target));
    }

    #[test]
    fn test_collecting_log() {
        let log = CollectingErrorLog::new();
        assert!(log.is_empty());

        let error = anyhow::anyhow!("denied");
        log.log(&failure(&error, StageKind::Middleware));
        log.log(&failure(&error, StageKind::Afterware));

        assert_eq!(log.len(), 2);
        assert_eq!(
            log.entries_of(StageKind::Middleware),
            vec![LoggedFailure {
                kind: StageKind::Middleware,
                index: 2,
                stage: "auth".to_string(),
                message: "denied".to_string(),
                halting: false,
            }]
        );

        log.clear();
        assert!(log.is_empty());
    }
}
