//! Per-run summaries.
//!
//! A [`RunReport`] describes a run that completed, including every failure
//! that was contained along the way.

use crate::logging::StageFailure;
use crate::stages::StageKind;
use crate::values::Args;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Record of a contained failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// The class of stage that failed.
    pub kind: StageKind,
    /// Position of the stage within its class.
    pub index: usize,
    /// The stage name.
    pub stage: String,
    /// The rendered error message.
    pub error: String,
    /// When the failure was observed.
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    /// Creates a failure record stamped with the current time.
    #[must_use]
    pub fn new(
        kind: StageKind,
        index: usize,
        stage: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            index,
            stage: stage.into(),
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

impl From<&StageFailure<'_>> for FailureRecord {
    fn from(failure: &StageFailure<'_>) -> Self {
        Self::new(
            failure.kind,
            failure.index,
            failure.stage,
            failure.error.to_string(),
        )
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of the run, also recorded on its tracing span.
    pub run_id: Uuid,
    /// The arguments the caller supplied.
    pub input_args: Args,
    /// The arguments the target was invoked with.
    pub target_args: Args,
    /// Whether the target returned a value.
    pub target_succeeded: bool,
    /// The final result, as left by the last afterware.
    pub result: Option<Value>,
    /// The arguments as left by the last afterware.
    pub final_args: Args,
    /// Number of middleware stages that returned without error.
    pub middleware_completed: usize,
    /// Number of afterware stages that returned without error.
    pub afterware_completed: usize,
    /// Every failure that was contained, in the order it happened.
    pub failures: Vec<FailureRecord>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub(crate) fn start(run_id: Uuid, input_args: Args) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            target_args: input_args.clone(),
            final_args: input_args.clone(),
            input_args,
            target_succeeded: false,
            result: None,
            middleware_completed: 0,
            afterware_completed: 0,
            failures: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Returns true if any failure was contained.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns the contained failures of one stage class.
    pub fn failures_of(&self, kind: StageKind) -> impl Iterator<Item = &FailureRecord> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    /// Returns how long the run took, in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failure_record_from_stage_failure() {
        let error = anyhow::anyhow!("bad input");
        let failure = StageFailure {
            kind: StageKind::Middleware,
            index: 1,
            stage: "validate",
            error: &error,
            halting: false,
        };

        let record = FailureRecord::from(&failure);

        assert_eq!(record.kind, StageKind::Middleware);
        assert_eq!(record.index, 1);
        assert_eq!(record.stage, "validate");
        assert_eq!(record.error, "bad input");
    }

    #[test]
    fn test_report_start() {
        let report = RunReport::start(Uuid::new_v4(), crate::args![1, 2]);

        assert_eq!(report.target_args, crate::args![1, 2]);
        assert_eq!(report.final_args, crate::args![1, 2]);
        assert!(!report.has_failures());
        assert_eq!(report.duration_ms(), 0);
    }

    #[test]
    fn test_failures_of_filters_by_kind() {
        let mut report = RunReport::start(Uuid::new_v4(), Args::new());
        report.failures.push(FailureRecord::new(StageKind::Middleware, 0, "a", "x"));
        report.failures.push(FailureRecord::new(StageKind::Afterware, 0, "b", "y"));
        report.failures.push(FailureRecord::new(StageKind::Middleware, 2, "c", "z"));

        let stages: Vec<&str> = report
            .failures_of(StageKind::Middleware)
            .map(|f| f.stage.as_str())
            .collect();
        assert_eq!(stages, vec!["a", "c"]);
    }

    #[test]
    fn test_report_serializes() {
        let report = RunReport::start(Uuid::nil(), crate::args!["x"]);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["input_args"], serde_json::json!(["x"]));
        assert_eq!(value["run_id"], serde_json::json!(Uuid::nil().to_string()));
    }
}
