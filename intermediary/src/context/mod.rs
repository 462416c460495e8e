//! Shared, mutable context for a pipeline run.
//!
//! Every stage of a run receives the same [`Context`]. It is the only
//! channel between stages besides the arguments and the result.

mod bag;
#[cfg(test)]
mod context_tests;

pub use bag::Context;
