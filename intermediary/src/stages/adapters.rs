//! Closure-backed stages.

use super::{Afterware, Middleware, Target};
use crate::context::Context;
use crate::values::{AfterwareOutput, Args};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

/// A middleware backed by a synchronous closure.
pub struct FnMiddleware<F>
where
    F: Fn(&Context, Args) -> anyhow::Result<Option<Args>> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&Context, Args) -> anyhow::Result<Option<Args>> + Send + Sync,
{
    /// Creates a new closure-backed middleware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnMiddleware<F>
where
    F: Fn(&Context, Args) -> anyhow::Result<Option<Args>> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&Context, Args) -> anyhow::Result<Option<Args>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &Context, args: Args) -> anyhow::Result<Option<Args>> {
        (self.func)(ctx, args)
    }
}

/// A middleware backed by a closure returning a future.
///
/// The closure gets its own handle on the context so the future can outlive
/// the borrow the engine holds.
pub struct AsyncFnMiddleware<F, Fut>
where
    F: Fn(Context, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<Args>>> + Send + 'static,
{
    name: String,
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnMiddleware<F, Fut>
where
    F: Fn(Context, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<Args>>> + Send + 'static,
{
    /// Creates a new async closure-backed middleware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Debug for AsyncFnMiddleware<F, Fut>
where
    F: Fn(Context, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<Args>>> + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnMiddleware")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F, Fut> Middleware for AsyncFnMiddleware<F, Fut>
where
    F: Fn(Context, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<Args>>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &Context, args: Args) -> anyhow::Result<Option<Args>> {
        (self.func)(ctx.clone(), args).await
    }
}

/// An afterware backed by a synchronous closure.
pub struct FnAfterware<F>
where
    F: Fn(&Context, Option<Value>, Args) -> anyhow::Result<Option<AfterwareOutput>> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnAfterware<F>
where
    F: Fn(&Context, Option<Value>, Args) -> anyhow::Result<Option<AfterwareOutput>> + Send + Sync,
{
    /// Creates a new closure-backed afterware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnAfterware<F>
where
    F: Fn(&Context, Option<Value>, Args) -> anyhow::Result<Option<AfterwareOutput>> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAfterware")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F> Afterware for FnAfterware<F>
where
    F: Fn(&Context, Option<Value>, Args) -> anyhow::Result<Option<AfterwareOutput>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(
        &self,
        ctx: &Context,
        result: Option<Value>,
        args: Args,
    ) -> anyhow::Result<Option<AfterwareOutput>> {
        (self.func)(ctx, result, args)
    }
}

/// An afterware backed by a closure returning a future.
pub struct AsyncFnAfterware<F, Fut>
where
    F: Fn(Context, Option<Value>, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<AfterwareOutput>>> + Send + 'static,
{
    name: String,
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnAfterware<F, Fut>
where
    F: Fn(Context, Option<Value>, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<AfterwareOutput>>> + Send + 'static,
{
    /// Creates a new async closure-backed afterware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Debug for AsyncFnAfterware<F, Fut>
where
    F: Fn(Context, Option<Value>, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<AfterwareOutput>>> + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnAfterware")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F, Fut> Afterware for AsyncFnAfterware<F, Fut>
where
    F: Fn(Context, Option<Value>, Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Option<AfterwareOutput>>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(
        &self,
        ctx: &Context,
        result: Option<Value>,
        args: Args,
    ) -> anyhow::Result<Option<AfterwareOutput>> {
        (self.func)(ctx.clone(), result, args).await
    }
}

/// A target backed by a synchronous closure.
pub struct FnTarget<F>
where
    F: Fn(Args) -> anyhow::Result<Value> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> Debug for FnTarget<F>
where
    F: Fn(Args) -> anyhow::Result<Value> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTarget")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F> Target for FnTarget<F>
where
    F: Fn(Args) -> anyhow::Result<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, args: Args) -> anyhow::Result<Value> {
        (self.func)(args)
    }
}

/// Wraps a synchronous closure as a named [`Target`].
pub fn target_fn<F>(name: impl Into<String>, func: F) -> FnTarget<F>
where
    F: Fn(Args) -> anyhow::Result<Value> + Send + Sync,
{
    FnTarget {
        name: name.into(),
        func,
    }
}
