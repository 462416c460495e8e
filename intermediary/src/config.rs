//! Per-run configuration.
//!
//! There is no file or environment layer: an [`InvolveConfig`] is built in
//! code (or deserialized from JSON) and handed to each `involve` call.

use crate::errors::ParseExecutionModeError;
use crate::stages::StageKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error-containment switches for one involved function.
///
/// Each switch decides what happens when a stage of that class fails: `true`
/// halts the run, `false` logs the failure and carries on with the last good
/// arguments and result. All three default to halting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvolveConfig {
    /// Halt when a middleware stage fails.
    #[serde(alias = "throwOnMiddleware")]
    pub throw_on_middleware: bool,
    /// Halt when an afterware stage fails.
    #[serde(alias = "throwOnAfterware")]
    pub throw_on_afterware: bool,
    /// Halt when the target fails.
    #[serde(alias = "throwOnTarget")]
    pub throw_on_target: bool,
}

impl Default for InvolveConfig {
    fn default() -> Self {
        Self::halt_all()
    }
}

impl InvolveConfig {
    /// Halts on any failure.
    #[must_use]
    pub const fn halt_all() -> Self {
        Self {
            throw_on_middleware: true,
            throw_on_afterware: true,
            throw_on_target: true,
        }
    }

    /// Contains every failure and always completes the run.
    #[must_use]
    pub const fn contain_all() -> Self {
        Self {
            throw_on_middleware: false,
            throw_on_afterware: false,
            throw_on_target: false,
        }
    }

    /// Sets whether a middleware failure halts the run.
    #[must_use]
    pub const fn with_throw_on_middleware(mut self, halt: bool) -> Self {
        self.throw_on_middleware = halt;
        self
    }

    /// Sets whether an afterware failure halts the run.
    #[must_use]
    pub const fn with_throw_on_afterware(mut self, halt: bool) -> Self {
        self.throw_on_afterware = halt;
        self
    }

    /// Sets whether a target failure halts the run.
    #[must_use]
    pub const fn with_throw_on_target(mut self, halt: bool) -> Self {
        self.throw_on_target = halt;
        self
    }

    /// Returns true if a failure of the given stage class halts the run.
    #[must_use]
    pub const fn halts_on(&self, kind: StageKind) -> bool {
        match kind {
            StageKind::Middleware => self.throw_on_middleware,
            StageKind::Target => self.throw_on_target,
            StageKind::Afterware => self.throw_on_afterware,
        }
    }
}

/// Where the process is running, as far as diagnostics are concerned.
///
/// The mode is passed explicitly; nothing reads it from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Diagnostics are emitted.
    #[default]
    Normal,
    /// Diagnostics are suppressed.
    Test,
}

impl ExecutionMode {
    /// Returns true in test mode.
    #[must_use]
    pub const fn is_test(self) -> bool {
        matches!(self, Self::Test)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Test => write!(f, "test"),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = ParseExecutionModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "normal" | "production" | "development" => Ok(Self::Normal),
            other => Err(ParseExecutionModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_default_halts_everywhere() {
        let config = InvolveConfig::default();
        assert_eq!(config, InvolveConfig::halt_all());
        assert!(config.halts_on(StageKind::Middleware));
        assert!(config.halts_on(StageKind::Target));
        assert!(config.halts_on(StageKind::Afterware));
    }

    #[test]
    fn test_builder_methods() {
        let config = InvolveConfig::default()
            .with_throw_on_middleware(false)
            .with_throw_on_target(false);

        assert!(!config.halts_on(StageKind::Middleware));
        assert!(!config.halts_on(StageKind::Target));
        assert!(config.halts_on(StageKind::Afterware));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: InvolveConfig =
            serde_json::from_value(json!({ "throwOnMiddleware": false })).unwrap();

        assert!(!config.throw_on_middleware);
        assert!(config.throw_on_afterware);
        assert!(config.throw_on_target);
    }

    #[test]
    fn test_snake_case_json() {
        let config: InvolveConfig =
            serde_json::from_value(json!({ "throw_on_afterware": false })).unwrap();

        assert_eq!(config, InvolveConfig::halt_all().with_throw_on_afterware(false));
    }

    #[test]
    fn test_execution_mode_parse() {
        assert_eq!("test".parse::<ExecutionMode>(), Ok(ExecutionMode::Test));
        assert_eq!(" Production ".parse::<ExecutionMode>(), Ok(ExecutionMode::Normal));
        assert!("staging".parse::<ExecutionMode>().is_err());
        assert_eq!(ExecutionMode::default().to_string(), "normal");
        assert!(ExecutionMode::Test.is_test());
    }
}
