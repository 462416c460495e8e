//! Test assertions for pipeline runs.

use super::CallJournal;
use crate::pipeline::RunReport;
use crate::stages::StageKind;

/// Asserts that the journal recorded exactly `expected`, in order.
pub fn assert_call_order(journal: &CallJournal, expected: &[&str]) {
    let actual = journal.entries();
    assert_eq!(
        actual, expected,
        "Expected call order {expected:?}, got {actual:?}"
    );
}

/// Asserts that `name` never ran.
pub fn assert_not_called(journal: &CallJournal, name: &str) {
    assert!(
        !journal.contains(name),
        "Expected '{}' not to run, but the journal has {:?}",
        name,
        journal.entries()
    );
}

/// Asserts the number of contained failures of one stage class.
pub fn assert_contained_failures(report: &RunReport, kind: StageKind, expected: usize) {
    let actual = report.failures_of(kind).count();
    assert_eq!(
        actual, expected,
        "Expected {expected} contained {kind} failures, got {actual}: {:?}",
        report.failures
    );
}
