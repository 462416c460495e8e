//! Stage traits and implementations.
//!
//! A pipeline wraps a [`Target`] with [`Middleware`] that runs before it
//! and [`Afterware`] that runs after it. Stages take the shared context as
//! their first parameter instead of being built per run from it.

mod adapters;

pub use adapters::{
    target_fn, AsyncFnAfterware, AsyncFnMiddleware, FnAfterware, FnMiddleware, FnTarget,
};

use crate::context::Context;
use crate::values::{AfterwareOutput, Args};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The three places a pipeline can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// A stage running before the target.
    Middleware,
    /// The wrapped function.
    Target,
    /// A stage running after the target.
    Afterware,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Middleware => write!(f, "middleware"),
            Self::Target => write!(f, "target"),
            Self::Afterware => write!(f, "afterware"),
        }
    }
}

/// A stage that runs before the target and may replace its arguments.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Returns the name used in logs and errors.
    fn name(&self) -> &str {
        "middleware"
    }

    /// Handles the call arguments.
    ///
    /// Return `Ok(Some(args))` to replace the arguments seen by later stages
    /// and the target, or `Ok(None)` to keep the current ones.
    async fn handle(&self, ctx: &Context, args: Args) -> anyhow::Result<Option<Args>>;
}

/// A stage that runs after the target and may replace its result and arguments.
#[async_trait]
pub trait Afterware: Send + Sync {
    /// Returns the name used in logs and errors.
    fn name(&self) -> &str {
        "afterware"
    }

    /// Handles the target's result and the arguments it was called with.
    ///
    /// Return `Ok(Some(output))` to replace both for later stages, or
    /// `Ok(None)` to keep the current pair.
    async fn handle(
        &self,
        ctx: &Context,
        result: Option<Value>,
        args: Args,
    ) -> anyhow::Result<Option<AfterwareOutput>>;
}

/// The function a pipeline wraps.
///
/// Implemented for every `Fn(Args) -> impl Future<Output = anyhow::Result<Value>>`,
/// so async closures can be used directly. See [`target_fn`] for
/// synchronous closures.
#[async_trait]
pub trait Target: Send + Sync {
    /// Returns the name used in logs and errors.
    fn name(&self) -> &str {
        "target"
    }

    /// Invokes the target.
    async fn invoke(&self, args: Args) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> Target for F
where
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn invoke(&self, args: Args) -> anyhow::Result<Value> {
        (self)(args).await
    }
}

#[async_trait]
impl<T: Middleware + ?Sized> Middleware for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn handle(&self, ctx: &Context, args: Args) -> anyhow::Result<Option<Args>> {
        (**self).handle(ctx, args).await
    }
}

#[async_trait]
impl<T: Afterware + ?Sized> Afterware for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn handle(
        &self,
        ctx: &Context,
        result: Option<Value>,
        args: Args,
    ) -> anyhow::Result<Option<AfterwareOutput>> {
        (**self).handle(ctx, result, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Doubler;

    #[async_trait]
    impl Middleware for Doubler {
        fn name(&self) -> &str {
            "doubler"
        }

        async fn handle(&self, _ctx: &Context, args: Args) -> anyhow::Result<Option<Args>> {
            Ok(Some(args.map(|v| json!(v.as_i64().unwrap_or_default() * 2))))
        }
    }

    #[tokio::test]
    async fn test_closure_target() {
        let target = |args: Args| async move { Ok::<_, anyhow::Error>(json!(args.len())) };

        assert_eq!(target.name(), "target");
        assert_eq!(target.invoke(crate::args![1, 2]).await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_arc_middleware_delegates() {
        let stage: Arc<dyn Middleware> = Arc::new(Doubler);
        let shared = Arc::new(stage);

        assert_eq!(shared.name(), "doubler");
        let out = shared.handle(&Context::new(), crate::args![2]).await.unwrap();
        assert_eq!(out, Some(crate::args![4]));
    }

    #[test]
    fn test_stage_kind_display() {
        assert_eq!(StageKind::Middleware.to_string(), "middleware");
        assert_eq!(StageKind::Target.to_string(), "target");
        assert_eq!(
            serde_json::to_value(StageKind::Afterware).unwrap(),
            json!("afterware")
        );
    }
}
