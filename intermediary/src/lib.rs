//! # Intermediary
//!
//! Wrap an async target function with ordered middleware and afterware.
//!
//! A [`Pipeline`] holds two ordered stage lists. [`Pipeline::involve`]
//! attaches them to a target and returns an [`Involved`] invocable. Each call
//! of it:
//!
//! - runs every middleware in the order added, each one able to replace the
//!   call arguments
//! - runs the target once with the last argument list produced
//! - runs every afterware in the order added, each one able to replace the
//!   result and the arguments
//!
//! All stages of a run share one [`Context`]. What happens when a stage fails
//! is decided per stage class by [`InvolveConfig`]: halt the run, or log and
//! carry on with the last good state.
//!
//! ## Quick Start
//!
//! ```rust
//! use intermediary::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let pipeline = Pipeline::builder()
//!     .middleware_fn("double", |_ctx, args: Args| {
//!         Ok(Some(args.map(|v| json!(v.as_i64().unwrap_or_default() * 2))))
//!     })
//!     .afterware_fn("stamp", |ctx, result, args| {
//!         ctx.set("stamped", true);
//!         Ok(Some(AfterwareOutput::new(result, args)))
//!     })
//!     .build();
//!
//! let sum = target_fn("sum", |args| Ok(json!(args.iter().filter_map(|v| v.as_i64()).sum::<i64>())));
//! let involved = pipeline.involve(sum, None, None);
//!
//! assert_eq!(involved.call(args![1, 2, 3]).await.unwrap(), Some(json!(12)));
//! assert_eq!(involved.context().get("stamped"), Some(json!(true)));
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod errors;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod values;

pub use config::{ExecutionMode, InvolveConfig};
pub use context::Context;
pub use errors::{IntermediaryError, InvalidCompositionError};
pub use pipeline::{series, Involved, Pipeline, PipelineBuilder, RunReport};
pub use serde_json::Value;
pub use values::{AfterwareOutput, Args};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::args;
    pub use crate::config::{ExecutionMode, InvolveConfig};
    pub use crate::context::Context;
    pub use crate::errors::{IntermediaryError, InvalidCompositionError};
    pub use crate::logging::{
        CollectingErrorLog, ErrorLog, NoOpErrorLog, StageFailure, TracingErrorLog,
    };
    pub use crate::pipeline::{
        series, FailureRecord, Involved, Pipeline, PipelineBuilder, RunReport,
    };
    pub use crate::stages::{target_fn, Afterware, Middleware, StageKind, Target};
    pub use crate::values::{AfterwareOutput, Args};
}
