//! Testing utilities for intermediary pipelines.
//!
//! This module provides:
//! - Recording and failing stages and targets
//! - A shared call journal for asserting execution order
//! - Assertions over journals and run reports

mod assertions;
mod mocks;

pub use assertions::{assert_call_order, assert_contained_failures, assert_not_called};
pub use mocks::{
    increment_args, AfterwareCall, CallJournal, FailingAfterware, FailingMiddleware,
    FailingTarget, RecordingAfterware, RecordingMiddleware, RecordingTarget, SlowMiddleware,
};
