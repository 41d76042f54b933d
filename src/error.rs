use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification used to decide how a runner error is surfaced.
///
/// Test failures are not represented here at all: a non-zero pytest exit
/// code is data, communicated through [`crate::models::RunResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The environment is missing something (project path, pytest binary).
    /// Actionable by the user before any test ever runs.
    Environment,
    /// pytest was spawned but the invocation itself went wrong.
    Execution,
}

/// Errors raised by the test runner itself.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("project path does not exist: {}", .0.display())]
    ProjectPathMissing(PathBuf),

    #[error("`{command}` was not found; install pytest and pytest-json-report")]
    PytestNotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to execute pytest")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            RunnerError::ProjectPathMissing(_) | RunnerError::PytestNotFound { .. } => {
                ErrorClass::Environment
            }
            RunnerError::Io(_) => ErrorClass::Execution,
        }
    }
}

/// Errors raised while turning a JSON report document into results.
///
/// A missing `tests` key is kept distinct from malformed entries so callers
/// can tell "this is not a pytest JSON report" apart from "the report is
/// damaged".
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report has no `tests` array; not a pytest JSON report")]
    MissingTests,

    #[error("malformed test entries in report: {0}")]
    MalformedTests(#[source] serde_json::Error),
}
