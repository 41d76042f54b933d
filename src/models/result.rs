use serde::{Deserialize, Serialize};

use super::outcome::Outcome;

/// One reported test execution, flattened out of the pytest JSON report.
///
/// Immutable once constructed; one instance per reported test per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// pytest's stable identifier: file path plus `::`-qualified test name.
    pub nodeid: String,
    /// Short name (the test function, without the file prefix).
    pub name: String,
    pub outcome: Outcome,
    /// Seconds, never negative.
    pub duration: f64,
    /// Failure text; populated only for failed/error outcomes.
    pub message: Option<String>,
    /// Source file the test lives in.
    pub file: String,
}

/// Aggregate counts over one run, rendered as the dashboard metric tiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Summed test duration in seconds.
    pub duration: f64,
}

impl RunSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Error => summary.errors += 1,
            }
            summary.duration += result.duration;
        }
        summary
    }
}

/// Everything one pytest invocation produced.
///
/// Created fresh on every run and discarded (or cached by the server) after
/// being displayed; nothing persists across runs except the report file
/// path, which is overwritten each time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// The raw report document. Absent if pytest exited before writing it.
    pub report: Option<serde_json::Value>,
    /// Parsed results, in report order. Empty if parsing failed.
    pub results: Vec<TestResult>,
    /// Why `report`/`results` are unusable, when they are.
    pub report_error: Option<String>,
}

impl RunResult {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }
}
