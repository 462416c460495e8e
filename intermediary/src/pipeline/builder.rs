//! Fluent pipeline builder.

use super::Pipeline;
use crate::context::Context;
use crate::stages::{
    Afterware, AsyncFnAfterware, AsyncFnMiddleware, FnAfterware, FnMiddleware, Middleware,
};
use crate::values::{AfterwareOutput, Args};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Builder for assembling a [`Pipeline`] stage by stage.
///
/// Stages run in the order they are added.
#[derive(Clone, Default)]
pub struct PipelineBuilder {
    middleware: Vec<Arc<dyn Middleware>>,
    afterware: Vec<Arc<dyn Afterware>>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn middleware(mut self, stage: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(stage));
        self
    }

    /// Appends a named synchronous middleware closure.
    #[must_use]
    pub fn middleware_fn<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Context, Args) -> anyhow::Result<Option<Args>> + Send + Sync + 'static,
    {
        self.middleware(FnMiddleware::new(name, func))
    }

    /// Appends a named async middleware closure.
    #[must_use]
    pub fn middleware_async_fn<F, Fut>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Context, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<Args>>> + Send + 'static,
    {
        self.middleware(AsyncFnMiddleware::new(name, func))
    }

    /// Appends an afterware stage.
    #[must_use]
    pub fn afterware(mut self, stage: impl Afterware + 'static) -> Self {
        self.afterware.push(Arc::new(stage));
        self
    }

    /// Appends a named synchronous afterware closure.
    #[must_use]
    pub fn afterware_fn<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Context, Option<Value>, Args) -> anyhow::Result<Option<AfterwareOutput>>
            + Send
            + Sync
            + 'static,
    {
        self.afterware(FnAfterware::new(name, func))
    }

    /// Appends a named async afterware closure.
    #[must_use]
    pub fn afterware_async_fn<F, Fut>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Context, Option<Value>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<AfterwareOutput>>> + Send + 'static,
    {
        self.afterware(AsyncFnAfterware::new(name, func))
    }

    /// Appends every stage of an existing pipeline.
    #[must_use]
    pub fn extend(mut self, pipeline: &Pipeline) -> Self {
        self.middleware.extend(pipeline.middleware().iter().cloned());
        self.afterware.extend(pipeline.afterware().iter().cloned());
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline::new(Some(self.middleware), Some(self.afterware))
    }
}
