pub mod pytest;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::error::RunnerError;
use crate::models::RunResult;

/// A discovered test file before any tests have been run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
}

/// Trait for tool-specific test runner adapters.
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Discover test files under the project root.
    async fn discover(&self) -> Result<Vec<DiscoveredFile>>;

    /// Run the suite, optionally narrowed by a keyword filter, and collect
    /// the invocation's output plus its parsed report.
    ///
    /// A non-zero exit code is a normal outcome (tests failed, or none were
    /// collected) and comes back inside the `Ok` value; `Err` means the
    /// runner itself could not execute.
    async fn run(&self, keyword: Option<&str>) -> Result<RunResult, RunnerError>;

    /// Display name for this runner (e.g., "pytest").
    fn name(&self) -> &str;
}

/// Construct the runner for the given project root.
pub fn detect(project: PathBuf, config: &Config) -> Result<Arc<dyn TestRunner>> {
    Ok(Arc::new(pytest::PytestRunner::new(project, config)?))
}
