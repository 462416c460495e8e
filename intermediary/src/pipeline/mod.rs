//! Pipeline construction and execution.
//!
//! This module provides:
//! - [`Pipeline`], an ordered middleware list and an ordered afterware list
//! - [`PipelineBuilder`] for fluent construction
//! - [`Involved`], the invocable produced by [`Pipeline::involve`]
//! - [`series`] composition of several pipelines into one run
//! - [`RunReport`] summaries of a run's contained failures

mod builder;
mod involved;
mod report;
mod series;

pub use builder::PipelineBuilder;
pub use involved::Involved;
pub use report::{FailureRecord, RunReport};
pub use series::series;

use crate::config::InvolveConfig;
use crate::context::Context;
use crate::errors::InvalidCompositionError;
use crate::stages::{
    Afterware, AsyncFnAfterware, AsyncFnMiddleware, FnAfterware, FnMiddleware, Middleware,
    Target,
};
use crate::values::{AfterwareOutput, Args};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// An ordered middleware list and an ordered afterware list.
///
/// Both lists run front to back: the first middleware added runs first,
/// and so does the first afterware. A pipeline never changes once built;
/// each [`involve`](Self::involve) produces an independent invocable.
#[derive(Clone, Default)]
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
    afterware: Vec<Arc<dyn Afterware>>,
}

impl Pipeline {
    /// Creates a pipeline. `None` means no stages of that kind.
    #[must_use]
    pub fn new(
        middleware: Option<Vec<Arc<dyn Middleware>>>,
        afterware: Option<Vec<Arc<dyn Afterware>>>,
    ) -> Self {
        Self {
            middleware: middleware.unwrap_or_default(),
            afterware: afterware.unwrap_or_default(),
        }
    }

    /// Creates a pipeline with no stages.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Starts a fluent builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Returns the middleware in execution order.
    #[must_use]
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Returns the afterware in execution order.
    #[must_use]
    pub fn afterware(&self) -> &[Arc<dyn Afterware>] {
        &self.afterware
    }

    /// Returns the total number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len() + self.afterware.len()
    }

    /// Returns true if the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty() && self.afterware.is_empty()
    }

    /// Returns the middleware names in execution order.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<String> {
        self.middleware.iter().map(|m| m.name().to_string()).collect()
    }

    /// Returns the afterware names in execution order.
    #[must_use]
    pub fn afterware_names(&self) -> Vec<String> {
        self.afterware.iter().map(|a| a.name().to_string()).collect()
    }

    /// Flattens several pipelines into one.
    ///
    /// Middleware lists are concatenated in order, and so are afterware
    /// lists; the afterware order is not reversed.
    #[must_use]
    pub fn concat(pipelines: &[Self]) -> Self {
        Self {
            middleware: pipelines
                .iter()
                .flat_map(|p| p.middleware.iter().cloned())
                .collect(),
            afterware: pipelines
                .iter()
                .flat_map(|p| p.afterware.iter().cloned())
                .collect(),
        }
    }

    /// Returns a pipeline running this one's stages, then `other`'s.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self::concat(&[self.clone(), other.clone()])
    }

    /// Attaches the pipeline to `target`, returning the invocable.
    ///
    /// `context` defaults to an empty [`Context`] and `config` to
    /// [`InvolveConfig::default`] (halt on any failure).
    pub fn involve(
        &self,
        target: impl Target + 'static,
        context: impl Into<Option<Context>>,
        config: impl Into<Option<InvolveConfig>>,
    ) -> Involved {
        self.involve_shared(Arc::new(target), context, config)
    }

    /// Like [`involve`](Self::involve), for a target that is already shared.
    pub fn involve_shared(
        &self,
        target: Arc<dyn Target>,
        context: impl Into<Option<Context>>,
        config: impl Into<Option<InvolveConfig>>,
    ) -> Involved {
        Involved::new(
            self.clone(),
            target,
            context.into().unwrap_or_default(),
            config.into().unwrap_or_default(),
        )
    }

    /// Composes `pipelines` in series around `target`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCompositionError`] if the composition is rejected.
    pub fn series(
        pipelines: &[Self],
        target: impl Target + 'static,
        context: impl Into<Option<Context>>,
        config: impl Into<Option<InvolveConfig>>,
    ) -> Result<Involved, InvalidCompositionError> {
        series(pipelines, target, context, config)
    }

    /// Adapts a synchronous `(context, args) -> args` function into a middleware.
    pub fn create_middleware<F>(func: F) -> Arc<dyn Middleware>
    where
        F: Fn(&Context, Args) -> anyhow::Result<Option<Args>> + Send + Sync + 'static,
    {
        Arc::new(FnMiddleware::new("middleware", func))
    }

    /// Adapts an async `(context, args) -> args` function into a middleware.
    pub fn create_async_middleware<F, Fut>(func: F) -> Arc<dyn Middleware>
    where
        F: Fn(Context, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<Args>>> + Send + 'static,
    {
        Arc::new(AsyncFnMiddleware::new("middleware", func))
    }

    /// Adapts a synchronous `(context, result, args) -> {result, args}`
    /// function into an afterware.
    pub fn create_afterware<F>(func: F) -> Arc<dyn Afterware>
    where
        F: Fn(&Context, Option<Value>, Args) -> anyhow::Result<Option<AfterwareOutput>>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(FnAfterware::new("afterware", func))
    }

    /// Adapts an async `(context, result, args) -> {result, args}` function
    /// into an afterware.
    pub fn create_async_afterware<F, Fut>(func: F) -> Arc<dyn Afterware>
    where
        F: Fn(Context, Option<Value>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<AfterwareOutput>>> + Send + 'static,
    {
        Arc::new(AsyncFnAfterware::new("afterware", func))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middleware", &self.middleware_names())
            .field("afterware", &self.afterware_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallJournal, RecordingAfterware, RecordingMiddleware};
    use pretty_assertions::assert_eq;

    fn pipeline(journal: &CallJournal, m: &[&str], a: &[&str]) -> Pipeline {
        Pipeline::new(
            Some(
                m.iter()
                    .map(|n| Arc::new(RecordingMiddleware::new(*n).with_journal(journal)) as Arc<dyn Middleware>)
                    .collect(),
            ),
            Some(
                a.iter()
                    .map(|n| Arc::new(RecordingAfterware::new(*n).with_journal(journal)) as Arc<dyn Afterware>)
                    .collect(),
            ),
        )
    }

    #[test]
    fn test_new_with_absent_lists() {
        let pipeline = Pipeline::new(None, None);
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.len(), 0);
    }

    #[test]
    fn test_concat_preserves_order() {
        let journal = CallJournal::new();
        let p1 = pipeline(&journal, &["m1", "m2"], &["a1"]);
        let p2 = pipeline(&journal, &["m3"], &["a2", "a3"]);

        let merged = Pipeline::concat(&[p1.clone(), p2.clone()]);

        assert_eq!(merged.middleware_names(), vec!["m1", "m2", "m3"]);
        assert_eq!(merged.afterware_names(), vec!["a1", "a2", "a3"]);
        assert_eq!(p1.then(&p2).middleware_names(), merged.middleware_names());
    }

    #[test]
    fn test_create_helpers_use_default_names() {
        let m = Pipeline::create_middleware(|_ctx, args| Ok(Some(args)));
        let a = Pipeline::create_afterware(|_ctx, result, args| {
            Ok(Some(AfterwareOutput::new(result, args)))
        });

        assert_eq!(m.name(), "middleware");
        assert_eq!(a.name(), "afterware");
    }

    #[test]
    fn test_debug_lists_stage_names() {
        let journal = CallJournal::new();
        let rendered = format!("{:?}", pipeline(&journal, &["auth"], &["format"]));

        assert!(rendered.contains("auth"));
        assert!(rendered.contains("format"));
    }
}
