//! Error types for the intermediary pipeline.
//!
//! Stage and target implementations fail with [`anyhow::Error`]; the engine
//! wraps whichever failure halted a run into an [`IntermediaryError`].

use crate::stages::StageKind;
use serde_json::Value;
use thiserror::Error;

/// The error returned by a halted pipeline run.
#[derive(Debug, Error)]
pub enum IntermediaryError {
    /// A middleware stage failed while `throw_on_middleware` was set.
    #[error("middleware '{stage}' (#{index}) halted the pipeline: {source}")]
    Middleware {
        /// Position of the stage in the middleware list.
        index: usize,
        /// The stage name.
        stage: String,
        /// The stage failure.
        #[source]
        source: anyhow::Error,
    },

    /// The target failed while `throw_on_target` was set.
    #[error("target '{stage}' halted the pipeline: {source}")]
    Target {
        /// The target name.
        stage: String,
        /// The target failure.
        #[source]
        source: anyhow::Error,
    },

    /// An afterware stage failed while `throw_on_afterware` was set.
    #[error("afterware '{stage}' (#{index}) halted the pipeline: {source}")]
    Afterware {
        /// Position of the stage in the afterware list.
        index: usize,
        /// The stage name.
        stage: String,
        /// The result established before the failing stage ran.
        last_result: Option<Value>,
        /// The stage failure.
        #[source]
        source: anyhow::Error,
    },

    /// No runtime could be started to drive a blocking call.
    #[error("failed to start a runtime for a blocking call: {source}")]
    Runtime {
        /// The runtime build failure.
        #[source]
        source: std::io::Error,
    },
}

impl IntermediaryError {
    /// Returns the kind of stage that halted the run.
    #[must_use]
    pub const fn stage_kind(&self) -> Option<StageKind> {
        match self {
            Self::Middleware { .. } => Some(StageKind::Middleware),
            Self::Target { .. } => Some(StageKind::Target),
            Self::Afterware { .. } => Some(StageKind::Afterware),
            Self::Runtime { .. } => None,
        }
    }

    /// Returns the last result established before the run halted.
    ///
    /// Only an afterware halt can have one; middleware and target halts
    /// happen before the target produced anything.
    #[must_use]
    pub const fn last_result(&self) -> Option<&Value> {
        match self {
            Self::Afterware { last_result, .. } => last_result.as_ref(),
            _ => None,
        }
    }

    /// Consumes the error, returning the last established result.
    #[must_use]
    pub fn into_last_result(self) -> Option<Value> {
        match self {
            Self::Afterware { last_result, .. } => last_result,
            _ => None,
        }
    }

    /// Returns true if a stage or the target halted the run.
    #[must_use]
    pub const fn is_halt(&self) -> bool {
        !matches!(self, Self::Runtime { .. })
    }
}

/// Error raised when a series of pipelines cannot be composed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid composition: {reason}")]
pub struct InvalidCompositionError {
    /// Why the composition was rejected.
    pub reason: String,
}

impl InvalidCompositionError {
    /// Creates a new composition error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The error for a series with no pipelines in it.
    #[must_use]
    pub fn empty() -> Self {
        Self::new("a series needs at least one pipeline")
    }
}

/// Error returned when parsing an unknown execution mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown execution mode: '{0}'")]
pub struct ParseExecutionModeError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_middleware_error_message() {
        let err = IntermediaryError::Middleware {
            index: 1,
            stage: "auth".to_string(),
            source: anyhow::anyhow!("denied"),
        };

        assert_eq!(
            err.to_string(),
            "middleware 'auth' (#1) halted the pipeline: denied"
        );
        assert_eq!(err.stage_kind(), Some(StageKind::Middleware));
        assert!(err.is_halt());
        assert!(err.last_result().is_none());
    }

    #[test]
    fn test_afterware_error_keeps_last_result() {
        let err = IntermediaryError::Afterware {
            index: 0,
            stage: "format".to_string(),
            last_result: Some(json!("partial")),
            source: anyhow::anyhow!("boom"),
        };

        assert_eq!(err.last_result(), Some(&json!("partial")));
        assert_eq!(err.into_last_result(), Some(json!("partial")));
    }

    #[test]
    fn test_error_source_chain() {
        let err = IntermediaryError::Target {
            stage: "fetch".to_string(),
            source: anyhow::anyhow!("target exploded"),
        };

        assert_eq!(
            err.to_string(),
            "target 'fetch' halted the pipeline: target exploded"
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("target exploded"));
    }

    #[test]
    fn test_runtime_error_is_not_a_halt() {
        let err = IntermediaryError::Runtime {
            source: std::io::Error::other("no threads"),
        };

        assert!(!err.is_halt());
        assert!(err.stage_kind().is_none());
        assert!(err.to_string().ends_with("no threads"));
    }

    #[test]
    fn test_empty_composition_message() {
        assert!(InvalidCompositionError::empty()
            .to_string()
            .contains("at least one pipeline"));
    }
}
