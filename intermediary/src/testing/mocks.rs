//! Mock stages and targets for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::context::Context;
use crate::stages::{Afterware, Middleware, Target};
use crate::values::{AfterwareOutput, Args};

/// A shared, ordered log of which stages ran.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `name` ran.
    pub fn record(&self, name: impl Into<String>) {
        self.entries.lock().push(name.into());
    }

    /// Returns the recorded names in order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Returns true if `name` was recorded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.lock().iter().any(|entry| entry == name)
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Clears the journal.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Adds `step` to every integer argument, leaving other values alone.
#[must_use]
pub fn increment_args(args: &Args, step: i64) -> Args {
    args.map(|value| match value.as_i64() {
        Some(n) => json!(n + step),
        None => value.clone(),
    })
}

/// A middleware that records the arguments it sees.
///
/// By default it passes the arguments on unchanged; see
/// [`incrementing`](Self::incrementing).
#[derive(Debug)]
pub struct RecordingMiddleware {
    name: String,
    step: Option<i64>,
    calls: Mutex<Vec<Args>>,
    journal: Option<CallJournal>,
}

impl RecordingMiddleware {
    /// Creates a pass-through recording middleware.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step: None,
            calls: Mutex::new(Vec::new()),
            journal: None,
        }
    }

    /// Creates a recording middleware that adds `step` to every integer argument.
    #[must_use]
    pub fn incrementing(name: impl Into<String>, step: i64) -> Self {
        Self {
            step: Some(step),
            ..Self::new(name)
        }
    }

    /// Records every call into `journal` as well.
    #[must_use]
    pub fn with_journal(mut self, journal: &CallJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Returns the arguments of every call.
    #[must_use]
    pub fn calls(&self) -> Vec<Args> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Middleware for RecordingMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _ctx: &Context, args: Args) -> anyhow::Result<Option<Args>> {
        self.calls.lock().push(args.clone());
        if let Some(journal) = &self.journal {
            journal.record(&self.name);
        }
        Ok(Some(match self.step {
            Some(step) => increment_args(&args, step),
            None => args,
        }))
    }
}

/// A middleware that always fails.
#[derive(Debug)]
pub struct FailingMiddleware {
    name: String,
    error: String,
    calls: AtomicUsize,
    journal: Option<CallJournal>,
}

impl FailingMiddleware {
    /// Creates a failing middleware.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
            calls: AtomicUsize::new(0),
            journal: None,
        }
    }

    /// Records every call into `journal` as well.
    #[must_use]
    pub fn with_journal(mut self, journal: &CallJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Middleware for FailingMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _ctx: &Context, _args: Args) -> anyhow::Result<Option<Args>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.record(&self.name);
        }
        Err(anyhow::anyhow!("{}", self.error))
    }
}

/// A middleware that sleeps before passing its arguments on.
#[derive(Debug)]
pub struct SlowMiddleware {
    name: String,
    delay: Duration,
    journal: Option<CallJournal>,
}

impl SlowMiddleware {
    /// Creates a slow middleware.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            journal: None,
        }
    }

    /// Creates a slow middleware with a delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(name: impl Into<String>, ms: u64) -> Self {
        Self::new(name, Duration::from_millis(ms))
    }

    /// Records every completed call into `journal`.
    #[must_use]
    pub fn with_journal(mut self, journal: &CallJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }
}

#[async_trait]
impl Middleware for SlowMiddleware {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _ctx: &Context, args: Args) -> anyhow::Result<Option<Args>> {
        tokio::time::sleep(self.delay).await;
        if let Some(journal) = &self.journal {
            journal.record(&self.name);
        }
        Ok(Some(args))
    }
}

/// A recorded afterware call.
#[derive(Debug, Clone, PartialEq)]
pub struct AfterwareCall {
    /// The result the stage received.
    pub result: Option<Value>,
    /// The arguments the stage received.
    pub args: Args,
}

/// An afterware that records the result and arguments it sees.
#[derive(Debug)]
pub struct RecordingAfterware {
    name: String,
    step: Option<i64>,
    calls: Mutex<Vec<AfterwareCall>>,
    journal: Option<CallJournal>,
}

impl RecordingAfterware {
    /// Creates a pass-through recording afterware.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step: None,
            calls: Mutex::new(Vec::new()),
            journal: None,
        }
    }

    /// Creates a recording afterware that adds `step` to every integer argument.
    #[must_use]
    pub fn incrementing(name: impl Into<String>, step: i64) -> Self {
        Self {
            step: Some(step),
            ..Self::new(name)
        }
    }

    /// Records every call into `journal` as well.
    #[must_use]
    pub fn with_journal(mut self, journal: &CallJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Returns every recorded call.
    #[must_use]
    pub fn calls(&self) -> Vec<AfterwareCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Afterware for RecordingAfterware {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(
        &self,
        _ctx: &Context,
        result: Option<Value>,
        args: Args,
    ) -> anyhow::Result<Option<AfterwareOutput>> {
        self.calls.lock().push(AfterwareCall {
            result: result.clone(),
            args: args.clone(),
        });
        if let Some(journal) = &self.journal {
            journal.record(&self.name);
        }
        let args = match self.step {
            Some(step) => increment_args(&args, step),
            None => args,
        };
        Ok(Some(AfterwareOutput::new(result, args)))
    }
}

/// An afterware that always fails.
#[derive(Debug)]
pub struct FailingAfterware {
    name: String,
    error: String,
    calls: AtomicUsize,
    journal: Option<CallJournal>,
}

impl FailingAfterware {
    /// Creates a failing afterware.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
            calls: AtomicUsize::new(0),
            journal: None,
        }
    }

    /// Records every call into `journal` as well.
    #[must_use]
    pub fn with_journal(mut self, journal: &CallJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Afterware for FailingAfterware {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(
        &self,
        _ctx: &Context,
        _result: Option<Value>,
        _args: Args,
    ) -> anyhow::Result<Option<AfterwareOutput>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.record(&self.name);
        }
        Err(anyhow::anyhow!("{}", self.error))
    }
}

/// A target that records its calls and returns a fixed value.
///
/// Clones share the same call log, so a test can keep one clone while the
/// pipeline owns another.
#[derive(Debug, Clone)]
pub struct RecordingTarget {
    result: Value,
    calls: Arc<Mutex<Vec<Args>>>,
    journal: Option<CallJournal>,
}

impl RecordingTarget {
    /// Creates a target returning `null`.
    #[must_use]
    pub fn new() -> Self {
        Self::returning(Value::Null)
    }

    /// Creates a target returning `result`.
    #[must_use]
    pub fn returning(result: impl Into<Value>) -> Self {
        Self {
            result: result.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
            journal: None,
        }
    }

    /// Records every call into `journal` as `"target"`.
    #[must_use]
    pub fn with_journal(mut self, journal: &CallJournal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Returns the arguments of every call.
    #[must_use]
    pub fn calls(&self) -> Vec<Args> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for RecordingTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Target for RecordingTarget {
    async fn invoke(&self, args: Args) -> anyhow::Result<Value> {
        self.calls.lock().push(args);
        if let Some(journal) = &self.journal {
            journal.record("target");
        }
        Ok(self.result.clone())
    }
}

/// A target that records its calls and always fails.
#[derive(Debug, Clone)]
pub struct FailingTarget {
    error: String,
    calls: Arc<AtomicUsize>,
}

impl FailingTarget {
    /// Creates a failing target.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Target for FailingTarget {
    async fn invoke(&self, _args: Args) -> anyhow::Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("{}", self.error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_increment_args_skips_non_integers() {
        let bumped = increment_args(&args![1, "a", 2.5, -3], 1);
        assert_eq!(bumped, args![2, "a", 2.5, -2]);
    }

    #[tokio::test]
    async fn test_recording_middleware() {
        let journal = CallJournal::new();
        let stage = RecordingMiddleware::incrementing("inc", 2).with_journal(&journal);

        let out = stage.handle(&Context::new(), args![1, 2]).await.unwrap();

        assert_eq!(out, Some(args![3, 4]));
        assert_eq!(stage.calls(), vec![args![1, 2]]);
        assert_eq!(journal.entries(), vec!["inc".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_middleware() {
        let stage = FailingMiddleware::new("fail", "nope");

        let err = stage.handle(&Context::new(), Args::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "nope");
        assert_eq!(stage.call_count(), 1);
    }

    #[tokio::test]
    async fn test_slow_middleware() {
        let stage = SlowMiddleware::with_delay_ms("slow", 10);

        let start = std::time::Instant::now();
        let out = stage.handle(&Context::new(), args![1]).await.unwrap();

        assert_eq!(out, Some(args![1]));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_recording_afterware() {
        let stage = RecordingAfterware::new("after");

        let out = stage
            .handle(&Context::new(), Some(json!("r")), args![1])
            .await
            .unwrap();

        assert_eq!(out, Some(AfterwareOutput::new(Some(json!("r")), args![1])));
        assert_eq!(
            stage.calls(),
            vec![AfterwareCall {
                result: Some(json!("r")),
                args: args![1],
            }]
        );
    }

    #[tokio::test]
    async fn test_recording_target_clones_share_calls() {
        let target = RecordingTarget::returning("done");
        let handle = target.clone();

        let value = target.invoke(args![1]).await.unwrap();

        assert_eq!(value, json!("done"));
        assert_eq!(handle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_target() {
        let target = FailingTarget::new("down");

        assert!(target.invoke(Args::new()).await.is_err());
        assert_eq!(target.call_count(), 1);
    }
}
