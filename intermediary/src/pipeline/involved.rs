//! The invocable produced by `Pipeline::involve`, and the run loop behind it.

use super::{FailureRecord, Pipeline, RunReport};
use crate::config::InvolveConfig;
use crate::context::Context;
use crate::errors::IntermediaryError;
use crate::logging::{ErrorLog, StageFailure, TracingErrorLog};
use crate::stages::{StageKind, Target};
use crate::values::Args;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};
use uuid::Uuid;

/// A target wrapped in a pipeline.
///
/// Every [`call`](Self::call) is an independent run: middleware in order,
/// then the target, then afterware in order. Runs share nothing but the
/// bound [`Context`]. Cloning an `Involved` keeps the same context.
#[derive(Clone)]
pub struct Involved {
    pipeline: Pipeline,
    target: Arc<dyn Target>,
    context: Context,
    config: InvolveConfig,
    log: Arc<dyn ErrorLog>,
}

impl Involved {
    pub(crate) fn new(
        pipeline: Pipeline,
        target: Arc<dyn Target>,
        context: Context,
        config: InvolveConfig,
    ) -> Self {
        Self {
            pipeline,
            target,
            context,
            config,
            log: Arc::new(TracingErrorLog::default()),
        }
    }

    /// Replaces the logging collaborator.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn ErrorLog>) -> Self {
        self.log = log;
        self
    }

    /// Returns the context every run of this invocable shares.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the containment configuration.
    #[must_use]
    pub const fn config(&self) -> InvolveConfig {
        self.config
    }

    /// Returns the pipeline wrapped around the target.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Runs the pipeline and returns the final result.
    ///
    /// `Ok(None)` means the run completed but no result was ever
    /// established, e.g. the target failed and its failure was contained.
    ///
    /// # Errors
    ///
    /// Returns the [`IntermediaryError`] of the stage that halted the run.
    pub async fn call(&self, args: impl Into<Args>) -> Result<Option<Value>, IntermediaryError> {
        self.call_with_report(args).await.map(|report| report.result)
    }

    /// Runs the pipeline and returns a report of the run.
    ///
    /// # Errors
    ///
    /// Returns the [`IntermediaryError`] of the stage that halted the run.
    pub async fn call_with_report(
        &self,
        args: impl Into<Args>,
    ) -> Result<RunReport, IntermediaryError> {
        let run_id = Uuid::new_v4();
        let span = debug_span!("intermediary.run", %run_id);
        self.run(run_id, args.into()).instrument(span).await
    }

    /// Runs the pipeline to completion on a fresh current-thread runtime.
    ///
    /// Stages may use tokio timers and I/O. Must not be called from inside
    /// an async context; use [`call`](Self::call) there.
    ///
    /// # Errors
    ///
    /// Returns the [`IntermediaryError`] of the stage that halted the run,
    /// or [`IntermediaryError::Runtime`] if no runtime could be started.
    pub fn call_blocking(&self, args: impl Into<Args>) -> Result<Option<Value>, IntermediaryError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| IntermediaryError::Runtime { source })?;
        runtime.block_on(self.call(args))
    }

    async fn run(&self, run_id: Uuid, input: Args) -> Result<RunReport, IntermediaryError> {
        let mut report = RunReport::start(run_id, input.clone());
        debug!(
            middleware = self.pipeline.middleware().len(),
            afterware = self.pipeline.afterware().len(),
            "pipeline run started"
        );

        // Only successful stages move `args` forward, so it always holds the
        // last good argument list.
        let mut args = input;
        for (index, stage) in self.pipeline.middleware().iter().enumerate() {
            debug!(stage_index = index, stage = stage.name(), "running middleware");
            match stage.handle(&self.context, args.clone()).await {
                Ok(Some(next)) => {
                    args = next;
                    report.middleware_completed += 1;
                }
                Ok(None) => report.middleware_completed += 1,
                Err(source) => {
                    if self.record(&mut report, StageKind::Middleware, index, stage.name(), &source) {
                        return Err(IntermediaryError::Middleware {
                            index,
                            stage: stage.name().to_string(),
                            source,
                        });
                    }
                }
            }
        }

        report.target_args = args.clone();
        debug!(target_name = self.target.name(), "running target");
        let mut result = match self.target.invoke(args.clone()).await {
            Ok(value) => {
                report.target_succeeded = true;
                Some(value)
            }
            Err(source) => {
                if self.record(&mut report, StageKind::Target, 0, self.target.name(), &source) {
                    return Err(IntermediaryError::Target {
                        stage: self.target.name().to_string(),
                        source,
                    });
                }
                None
            }
        };

        for (index, stage) in self.pipeline.afterware().iter().enumerate() {
            debug!(stage_index = index, stage = stage.name(), "running afterware");
            match stage.handle(&self.context, result.clone(), args.clone()).await {
                Ok(Some(output)) => {
                    result = output.result;
                    args = output.args;
                    report.afterware_completed += 1;
                }
                Ok(None) => report.afterware_completed += 1,
                Err(source) => {
                    if self.record(&mut report, StageKind::Afterware, index, stage.name(), &source) {
                        return Err(IntermediaryError::Afterware {
                            index,
                            stage: stage.name().to_string(),
                            last_result: result,
                            source,
                        });
                    }
                }
            }
        }

        report.result = result;
        report.final_args = args;
        report.finished_at = Utc::now();
        debug!(
            contained_failures = report.failures.len(),
            "pipeline run finished"
        );
        Ok(report)
    }

    /// Logs a failure and returns true if it halts the run.
    fn record(
        &self,
        report: &mut RunReport,
        kind: StageKind,
        index: usize,
        stage: &str,
        error: &anyhow::Error,
    ) -> bool {
        let failure = StageFailure {
            kind,
            index,
            stage,
            error,
            halting: self.config.halts_on(kind),
        };
        self.log.log(&failure);

        if failure.halting {
            debug!(stage_kind = %kind, stage_index = index, "pipeline run halted");
        } else {
            report.failures.push(FailureRecord::from(&failure));
        }
        failure.halting
    }
}

impl fmt::Debug for Involved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Involved")
            .field("pipeline", &self.pipeline)
            .field("target", &self.target.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// An involved function is itself a target, so pipelines can be nested.
///
/// A halted inner run fails the outer target; a missing inner result is
/// passed on as `null`.
#[async_trait]
impl Target for Involved {
    fn name(&self) -> &str {
        "involved"
    }

    async fn invoke(&self, args: Args) -> anyhow::Result<Value> {
        let result = self.call(args).await?;
        Ok(result.unwrap_or(Value::Null))
    }
}
